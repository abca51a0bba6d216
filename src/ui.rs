use std::io::{self, IsTerminal};

use crate::app::{EventView, SigninOutcome, SigninView, WorkOrderView, WorkerView};
use crate::domain::attendance::{Activity, ActivitySignin};
use crate::domain::lookup::{Locale, Lookup};
use crate::domain::work_order::{Employer, WorkAssignment, WorkOrder, WorkOrderSummary};
use crate::lookup_cache::LookupSnapshot;
use crate::reports::units::{
    ActivityData, ClientProfile, DailySumData, DispatchData, EmployerModel, ReportUnit,
    WeeklySumData, WorkerData,
};

pub fn print_workers(workers: &[WorkerView]) {
    let palette = Palette::auto();
    println!("{}", palette.heading("Members"));
    if workers.is_empty() {
        println!("{}", palette.dim("no members matched"));
        return;
    }
    for view in workers {
        println!("{}", format_worker_row(view, &palette));
    }
    println!("{}", palette.dim(&format!("{} member(s)", workers.len())));
}

pub fn print_worker(view: &WorkerView) {
    let palette = Palette::auto();
    let worker = &view.worker;
    println!("{}", format_worker_row(view, &palette));
    println!("  member since {} until {}", worker.date_of_membership, worker.member_expiration_date);
    if let Some(born) = worker.date_of_birth.as_deref() {
        println!("  born {born}");
    }
    if let Some(zip) = worker.zipcode.as_deref() {
        println!("  zip {zip}");
    }
    println!("  english level {}", worker.english_level);
}

fn format_worker_row(view: &WorkerView, palette: &Palette) -> String {
    let worker = &view.worker;
    let mut line = format!(
        "{} {} {}",
        palette.id(&format!("#{}", worker.dwccardnum)),
        palette.status(&view.member_status_text),
        worker.full_name()
    );
    if !view.skills.is_empty() {
        line.push(' ');
        line.push_str(&palette.tags(&view.skills));
    }
    line
}

pub fn print_employers(employers: &[Employer]) {
    let palette = Palette::auto();
    println!("{}", palette.heading("Employers"));
    if employers.is_empty() {
        println!("{}", palette.dim("no employers"));
        return;
    }
    for employer in employers {
        let mut line = format!("{} {}", palette.id(&employer.record.id.to_string()), employer.name);
        if let Some(zip) = employer.zipcode.as_deref() {
            line.push(' ');
            line.push_str(&palette.dim(zip));
        }
        println!("{line}");
    }
}

pub fn print_work_order(view: &WorkOrderView) {
    let palette = Palette::auto();
    let order = &view.order;
    println!(
        "{} {} {}",
        palette.id(&format!("order {}", order.record.id)),
        palette.status(&view.status_text),
        order.date_time_of_work
    );
    println!("  {} {}, {} {}", order.work_site_address1, order.city, order.state, order.zipcode);
    println!("  contact {} {}", order.contact_name, order.phone);
    if order.permanent_placement {
        println!("  {}", palette.tags("permanent placement"));
    }
    print_assignments(&view.assignments);
    if !view.requests.is_empty() {
        let ids = view
            .requests
            .iter()
            .map(|request| request.worker_id.to_string())
            .collect::<Vec<_>>();
        println!("  requested workers: {}", ids.join(", "));
    }
}

pub fn print_work_orders(orders: &[WorkOrder], lookups: &LookupSnapshot, locale: Locale) {
    let palette = Palette::auto();
    println!("{}", palette.heading("Work orders"));
    if orders.is_empty() {
        println!("{}", palette.dim("no work orders matched"));
        return;
    }
    for order in orders {
        let status = lookups
            .by_id(order.status, locale)
            .map(str::to_string)
            .unwrap_or_else(|_| order.status.to_string());
        println!(
            "{} {} {} {}",
            palette.id(&order.record.id.to_string()),
            palette.status(&status),
            order.date_time_of_work,
            order.contact_name
        );
    }
    println!("{}", palette.dim(&format!("{} order(s)", orders.len())));
}

pub fn print_order_summary(rows: &[WorkOrderSummary], lookups: &LookupSnapshot, locale: Locale) {
    let palette = Palette::auto();
    println!("{}", palette.heading("Work orders by day"));
    for row in rows {
        let status = lookups
            .by_id(row.status, locale)
            .map(str::to_string)
            .unwrap_or_else(|_| row.status.to_string());
        println!("{} {} {}", row.date, palette.status(&status), row.count);
    }
}

pub fn print_assignments(assignments: &[WorkAssignment]) {
    let palette = Palette::auto();
    if assignments.is_empty() {
        println!("  {}", palette.dim("no assignments"));
        return;
    }
    for assignment in assignments {
        let worker = match assignment.worker_assigned_id {
            Some(id) => format!("worker {id}"),
            None => palette.dim("open"),
        };
        println!(
            "  {} skill {} {}h @ {:.2} {}",
            palette.id(&assignment.record.id.to_string()),
            assignment.skill_id,
            assignment.hours,
            assignment.hourly_wage,
            worker
        );
    }
}

pub fn print_signin_outcome(outcome: &SigninOutcome) {
    let palette = Palette::auto();
    println!(
        "{} {} signed in at {}",
        palette.id(&format!("#{}", outcome.signin.dwccardnum)),
        outcome.full_name,
        outcome.signin.date_for_signin
    );
    let flags = member_flags(
        outcome.member_expired,
        outcome.member_inactive,
        outcome.member_sanctioned,
        outcome.member_expelled,
    );
    if !flags.is_empty() {
        println!(
            "{}",
            palette.warn(&format!("{} (expires {})", flags.join(", "), outcome.expiration_date))
        );
    }
}

pub fn print_signin_board(date: &str, rows: &[SigninView]) {
    let palette = Palette::auto();
    println!("{}", palette.heading(&format!("Sign-ins for {date}")));
    if rows.is_empty() {
        println!("{}", palette.dim("nobody signed in"));
        return;
    }
    for row in rows {
        let mut line = format!(
            "{} {} {}",
            palette.id(&format!("#{}", row.dwccardnum)),
            row.full_name,
            palette.tags(&row.skills)
        );
        if let Some(stamp) = row.lottery_timestamp.as_deref() {
            line.push_str(&format!(" lottery {stamp}"));
        }
        if let Some(assignment) = row.work_assignment_id {
            line.push_str(&format!(" -> assignment {assignment}"));
        }
        let flags = member_flags(
            row.member_expired,
            row.member_inactive,
            row.member_sanctioned,
            row.member_expelled,
        );
        if !flags.is_empty() {
            line.push(' ');
            line.push_str(&palette.warn(&flags.join(",")));
        }
        println!("{line}");
    }
    println!("{}", palette.dim(&format!("{} sign-in(s)", rows.len())));
}

fn member_flags(expired: bool, inactive: bool, sanctioned: bool, expelled: bool) -> Vec<&'static str> {
    [
        (expired, "expired"),
        (inactive, "inactive"),
        (sanctioned, "sanctioned"),
        (expelled, "expelled"),
    ]
    .into_iter()
    .filter_map(|(set, label)| set.then_some(label))
    .collect()
}

pub fn print_lookups(lookups: &[Lookup], locale: Locale) {
    let palette = Palette::auto();
    let mut current: Option<&str> = None;
    for lookup in lookups {
        if current != Some(lookup.category.as_str()) {
            println!("{}", palette.heading(&lookup.category));
            current = Some(lookup.category.as_str());
        }
        let key = lookup.key.as_deref().unwrap_or("-");
        println!(
            "  {} {} {}",
            palette.id(&lookup.id.to_string()),
            lookup.text(locale),
            palette.dim(&format!("({key})"))
        );
    }
}

pub fn print_activities(activities: &[Activity], lookups: &LookupSnapshot, locale: Locale) {
    let palette = Palette::auto();
    println!("{}", palette.heading("Activities"));
    if activities.is_empty() {
        println!("{}", palette.dim("no activities"));
        return;
    }
    for activity in activities {
        let name = lookups
            .by_id(activity.name_id, locale)
            .map(str::to_string)
            .unwrap_or_else(|_| activity.name_id.to_string());
        let mut line = format!(
            "{} {} {} to {}",
            palette.id(&activity.record.id.to_string()),
            name,
            activity.date_start,
            activity.date_end
        );
        if let Some(teacher) = activity.teacher.as_deref() {
            line.push(' ');
            line.push_str(&palette.dim(teacher));
        }
        println!("{line}");
    }
}

pub fn print_attendees(signins: &[ActivitySignin]) {
    let palette = Palette::auto();
    for signin in signins {
        let registered = if signin.person_id.is_some() {
            String::new()
        } else {
            format!(" {}", palette.warn("unregistered"))
        };
        println!(
            "{} {}{}",
            palette.id(&format!("#{}", signin.dwccardnum)),
            signin.date_for_signin,
            registered
        );
    }
    println!("{}", palette.dim(&format!("{} attendee(s)", signins.len())));
}

pub fn print_events(events: &[EventView]) {
    let palette = Palette::auto();
    if events.is_empty() {
        println!("{}", palette.dim("no events"));
        return;
    }
    for view in events {
        let event = &view.event;
        let span = match event.date_to.as_deref() {
            Some(to) => format!("{} to {to}", event.date_from),
            None => event.date_from.clone(),
        };
        println!(
            "{} {} {}",
            palette.id(&event.record.id.to_string()),
            palette.status(&view.label),
            span
        );
    }
}

pub fn print_daily_summary(data: &DailySumData) {
    let palette = Palette::auto();
    println!("{}", palette.heading(&format!("Daily summary {}", data.date)));
    for (label, value) in [
        ("DWC dispatched", data.dwc_count),
        ("DWC requested", data.dwc_requested),
        ("HHH dispatched", data.hhh_count),
        ("HHH requested", data.hhh_requested),
        ("sign-ins", data.total_signins),
        ("unique sign-ins", data.unique_signins),
        ("cancelled jobs", data.cancelled_jobs),
        ("assignments", data.total_assignments),
    ] {
        println!("  {label:<16} {value}");
    }
}

pub fn print_weekly_summary(rows: &[WeeklySumData]) {
    let palette = Palette::auto();
    println!("{}", palette.heading("Weekly summary"));
    for row in rows {
        println!(
            "{} {:<9} signins {:>3} jobs {:>3} hours {:>4} pay {:>9.2} wage {:>6.2} {}",
            row.date,
            row.day_of_week,
            row.total_signins,
            row.num_jobs,
            row.est_daily_hours,
            row.est_payment,
            row.hourly_wage,
            palette.tags(&format_units(&row.top_jobs))
        );
    }
}

pub fn print_dispatch_summary(rows: &[DispatchData]) {
    let palette = Palette::auto();
    println!("{}", palette.heading("Dispatch summary"));
    for row in rows {
        println!(
            "{} {}",
            palette.id(&row.date_start),
            palette.dim(&format!("until {}", row.date_end))
        );
        println!(
            "  signins {} unique {} dispatched {} (temp {}, permanent {}, undup {})",
            row.total_signins,
            row.unique_signins,
            row.dispatched,
            row.temp_dispatched,
            row.permanent_placements,
            row.undup_dispatched
        );
        println!(
            "  cancelled {} not assigned {} hours {} income {:.2} avg {:.2}",
            row.cancelled_assignments,
            row.count_not_assigned,
            row.total_hours,
            row.total_income,
            row.avg_income_per_hour
        );
        if !row.skills.is_empty() {
            println!("  {}", palette.tags(&format_units(&row.skills)));
        }
    }
}

pub fn print_activity_report(rows: &[ActivityData]) {
    let palette = Palette::auto();
    println!("{}", palette.heading("Activity attendance"));
    for row in rows {
        println!(
            "{} {:<20} attendance {:>3} rockstars {:>3}",
            row.date, row.activity_name, row.attendance, row.more_than_x_hours
        );
    }
}

pub fn print_worker_report(rows: &[WorkerData]) {
    let palette = Palette::auto();
    println!("{}", palette.heading("Member report"));
    for row in rows {
        println!(
            "{} {}",
            palette.id(&row.date_start),
            palette.dim(&format!("until {}", row.date_end))
        );
        println!(
            "  active {} enrolled {} left {} single {} (new {}) families {} (new {}) zip {}",
            row.active,
            row.newly_enrolled,
            row.people_who_left,
            row.single_adults,
            row.new_single_adults,
            row.family_households,
            row.new_family_households,
            row.zip_completeness
        );
    }
}

pub fn print_employer_report(rows: &[EmployerModel]) {
    let palette = Palette::auto();
    println!("{}", palette.heading("Employers by zip"));
    for row in rows {
        println!(
            "{} jobs {:>3} employers {:>3} {}",
            palette.id(&row.zip),
            row.jobs,
            row.employers,
            palette.tags(&format_units(&row.skills))
        );
    }
}

pub fn print_client_profile(profile: &ClientProfile) {
    let palette = Palette::auto();
    println!(
        "{}",
        palette.heading(&format!("Client profile {} to {}", profile.begin, profile.end))
    );
    for (title, units) in [
        ("homeless", &profile.homeless),
        ("household", &profile.household_composition),
        ("income", &profile.income),
        ("age", &profile.age),
        ("gender", &profile.gender),
        ("disability", &profile.disability),
        ("refugee/immigrant", &profile.refugee_immigrant),
        ("english", &profile.english_level),
    ] {
        println!("  {:<18} {}", title, format_units(units));
    }
    for day in &profile.race {
        let counts = day
            .counts
            .iter()
            .map(|(race, count)| format!("{race}={count}"))
            .collect::<Vec<_>>();
        println!("  {:<18} {} {}", "race", day.date, counts.join(" "));
    }
}

/// `label=count` pairs, falling back to the date for unlabeled units.
fn format_units(units: &[ReportUnit]) -> String {
    units
        .iter()
        .map(|unit| {
            let label = unit
                .info
                .as_deref()
                .or(unit.date.as_deref())
                .unwrap_or("?");
            format!("{label}={}", unit.count)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

struct Palette {
    enabled: bool,
}

impl Palette {
    fn auto() -> Self {
        let enabled = std::env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal();
        Self { enabled }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.enabled {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn heading(&self, text: &str) -> String {
        self.paint("1;36", text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint("2", text)
    }

    fn id(&self, text: &str) -> String {
        self.paint("1;94", text)
    }

    fn warn(&self, text: &str) -> String {
        self.paint("1;33", text)
    }

    fn status(&self, status: &str) -> String {
        let upper = status.to_uppercase();
        self.paint(status_color_code(status), &format!("[{upper}]"))
    }

    fn tags(&self, text: &str) -> String {
        self.paint("90", text)
    }
}

fn status_color_code(status: &str) -> &'static str {
    match status.trim().to_ascii_lowercase().as_str() {
        "active" => "32",
        "pending" => "33",
        "completed" => "36",
        "sanctioned" | "sanction" => "33",
        "cancelled" | "expelled" => "31",
        "expired" | "inactive" => "90",
        _ => "37",
    }
}
