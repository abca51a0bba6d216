mod app;
mod cli;
mod cli_ops;
mod completions;
mod config;
mod dates;
mod db;
mod doctor;
mod domain;
mod init;
mod logging;
mod lookup_cache;
mod perf;
mod reports;
#[cfg(test)]
mod test_support;
mod ui;

use app::{App, AppError, WorkerKey};
use cli::{
    ActivitySubcommands, AssignSubcommands, Commands, EmployerSubcommands, EventSubcommands,
    LookupSubcommands, OrderAddArgs, OrderSubcommands, ReportSubcommands, SigninSubcommands,
    WorkerAddArgs, WorkerRef, WorkerSubcommands,
};
use config::Config;
use dates::{add_months, format_date, format_datetime, parse_date, parse_datetime, today};
use domain::attendance::Activity;
use domain::lookup::{category, Locale};
use domain::record::Record;
use domain::validation::non_empty;
use domain::work_order::WorkOrder;
use domain::worker::Worker;
use reports::parse_range;
use reports::units::Period;
use time::Date;

const DEFAULT_USER: &str = "machete";

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn print_json(value: &impl serde::Serialize) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).expect("json serialization should work")
    );
}

fn run() -> Result<(), AppError> {
    use clap::Parser;

    let cli = cli::Cli::parse();
    logging::init(cli.verbose);

    if let Commands::Completions(args) = &cli.command {
        return completions::run_completions_command(args.shell.as_deref(), args.install);
    }
    if let Commands::Perf(args) = &cli.command {
        return run_perf(args);
    }

    let user = resolve_user(cli.user.as_deref());
    if let Commands::Init = &cli.command {
        init::init_local_store(&cli.db, &cli.config, &user)?;
        return Ok(());
    }

    let mut config = Config::load(&cli.config)?;
    if let Some(raw) = cli.locale.as_deref() {
        config.locale = parse_locale(raw)?;
    }
    tracing::debug!(db = %cli.db, locale = %config.locale, user = %user, "opening store");
    let app = App::open(&cli.db, config, &user)?;

    match cli.command {
        Commands::Init | Commands::Completions(_) | Commands::Perf(_) => {}
        Commands::Lookup(args) => run_lookup(&app, args.command)?,
        Commands::Worker(args) => run_worker(&app, args.command)?,
        Commands::Employer(args) => match args.command {
            EmployerSubcommands::Add(add) => {
                let employer =
                    app.create_employer(&add.name, add.phone.as_deref(), add.zip.as_deref())?;
                println!("created employer {} {}", employer.record.id, employer.name);
            }
            EmployerSubcommands::List(flag) => {
                let employers = app.list_employers()?;
                if flag.json {
                    print_json(&employers);
                } else {
                    ui::print_employers(&employers);
                }
            }
        },
        Commands::Order(args) => run_order(&app, args.command)?,
        Commands::Assign(args) => run_assign(&app, args.command)?,
        Commands::Signin(args) => run_signin(&app, args.command)?,
        Commands::Activity(args) => run_activity(&app, args.command)?,
        Commands::Event(args) => run_event(&app, args.command)?,
        Commands::Report(args) => run_report(&app, args.command)?,
        Commands::Doctor(args) => {
            let report = app.doctor()?;
            if args.json {
                print_json(&report);
            } else {
                for check in &report.checks {
                    println!(
                        "{} [{}] {}",
                        check.name,
                        serde_json::to_string(&check.status)
                            .expect("status serialization should work")
                            .trim_matches('"'),
                        check.detail
                    );
                }
            }
            if report.failure_count() > 0 {
                return Err(AppError::InvalidArgument(format!(
                    "doctor found {} failing check(s)",
                    report.failure_count()
                )));
            }
        }
    }
    Ok(())
}

fn run_perf(args: &cli::PerfArgs) -> Result<(), AppError> {
    let report = perf::run_perf_harness(args.iterations)
        .map_err(|err| AppError::InvalidArgument(err.to_string()))?;
    if args.json {
        print_json(&report);
    } else {
        println!("perf iterations={}", report.iterations);
        for measurement in &report.measurements {
            println!(
                "  {} elapsed_ms={:.2} budget_ms={:.2} within_budget={}",
                measurement.name,
                measurement.elapsed_ms,
                measurement.budget_ms,
                measurement.within_budget
            );
        }
    }
    if args.strict && report.over_budget_count() > 0 {
        return Err(AppError::InvalidArgument(format!(
            "perf found {} measurement(s) over budget",
            report.over_budget_count()
        )));
    }
    Ok(())
}

fn run_lookup(app: &App, command: LookupSubcommands) -> Result<(), AppError> {
    match command {
        LookupSubcommands::List(args) => {
            let lookups = app.list_lookups(args.category.as_deref())?;
            if args.json {
                print_json(&lookups);
            } else {
                ui::print_lookups(&lookups, app.locale());
            }
        }
        LookupSubcommands::Show(args) => {
            let lookup = app.show_lookup(args.id)?;
            if args.json {
                print_json(&lookup);
            } else {
                ui::print_lookups(std::slice::from_ref(&lookup), app.locale());
            }
        }
        LookupSubcommands::Resolve(args) => {
            println!("{}", app.resolve_lookup(&args.category, &args.value)?);
        }
        LookupSubcommands::Refresh => {
            let count = app.seed_lookups()?;
            app.refresh_lookups()?;
            println!("reloaded {count} lookups");
        }
    }
    Ok(())
}

fn run_worker(app: &App, command: WorkerSubcommands) -> Result<(), AppError> {
    match command {
        WorkerSubcommands::Add(args) => {
            let json = args.json;
            let worker = worker_from_args(app, args)?;
            let view = app.create_worker(worker)?;
            if json {
                print_json(&view);
            } else {
                ui::print_worker(&view);
            }
        }
        WorkerSubcommands::Show(args) => {
            let view = app.show_worker(worker_key(&args.worker))?;
            if args.json {
                print_json(&view);
            } else {
                ui::print_worker(&view);
            }
        }
        WorkerSubcommands::List(args) => {
            let status = args
                .status
                .as_deref()
                .map(|raw| app.resolve_lookup(category::MEMBER_STATUS, raw))
                .transpose()?;
            let workers = app.list_workers(status)?;
            if args.json {
                print_json(&workers);
            } else {
                ui::print_workers(&workers);
            }
        }
        WorkerSubcommands::Status(args) => {
            let status = app.resolve_lookup(category::MEMBER_STATUS, &args.status)?;
            let view = app.set_member_status(worker_key(&args.worker), status)?;
            println!(
                "card {} is now {}",
                view.worker.dwccardnum, view.member_status_text
            );
        }
        WorkerSubcommands::Renew(args) => {
            let view = app.renew_membership(worker_key(&args.worker), &args.expires)?;
            println!(
                "card {} expires {} ({})",
                view.worker.dwccardnum, view.worker.member_expiration_date, view.member_status_text
            );
        }
    }
    Ok(())
}

fn worker_from_args(app: &App, args: WorkerAddArgs) -> Result<Worker, AppError> {
    if args.skills.len() > 3 {
        return Err(AppError::InvalidArgument(
            "a member has at most three skills".to_string(),
        ));
    }
    let optional = |lookup_category: &str, raw: Option<&str>| {
        raw.map(|value| app.resolve_lookup(lookup_category, value))
            .transpose()
    };
    let mut skills = args
        .skills
        .iter()
        .map(|raw| app.resolve_lookup(category::SKILL, raw))
        .collect::<Result<Vec<_>, _>>()?
        .into_iter();

    let joined = match args.joined.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => today(),
    };
    let expires = match args.expires.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => default_expiration(joined)?,
    };
    let date_of_birth = args
        .date_of_birth
        .as_deref()
        .map(parse_date)
        .transpose()?
        .map(format_date);

    Ok(Worker {
        record: Record::default(),
        dwccardnum: args.card,
        first_name: args.first_name.trim().to_string(),
        last_name: args.last_name.trim().to_string(),
        member_status: app.resolve_lookup(category::MEMBER_STATUS, &args.status)?,
        date_of_membership: format_date(joined),
        member_expiration_date: format_date(expires),
        date_of_birth,
        type_of_work_id: app.resolve_lookup(category::WORK_TYPE, &args.work_type)?,
        marital_status: optional(category::MARITAL_STATUS, args.marital.as_deref())?,
        live_with_children: args.children,
        homeless: args.homeless,
        immigrant_refugee: args.refugee,
        disabled: args.disabled,
        race_id: optional(category::RACE, args.race.as_deref())?,
        income_id: optional(category::INCOME, args.income.as_deref())?,
        gender_id: optional(category::GENDER, args.gender.as_deref())?,
        english_level: args.english,
        zipcode: args.zip.as_deref().and_then(non_empty),
        skill1: skills.next(),
        skill2: skills.next(),
        skill3: skills.next(),
    })
}

fn run_order(app: &App, command: OrderSubcommands) -> Result<(), AppError> {
    match command {
        OrderSubcommands::Add(args) => {
            let json = args.json;
            let order = app.create_work_order(order_from_args(app, args)?)?;
            if json {
                print_json(&order);
            } else {
                println!(
                    "created work order {} for {}",
                    order.record.id, order.date_time_of_work
                );
            }
        }
        OrderSubcommands::Show(args) => {
            let view = app.show_work_order(args.id)?;
            if args.json {
                print_json(&view);
            } else {
                ui::print_work_order(&view);
            }
        }
        OrderSubcommands::List(args) => {
            let orders = app.list_work_orders(args.date.as_deref())?;
            if args.json {
                print_json(&orders);
            } else {
                ui::print_work_orders(&orders, &*app.lookups()?, app.locale());
            }
        }
        OrderSubcommands::Status(args) => {
            let status = app.resolve_lookup(category::ORDER_STATUS, &args.status)?;
            let order = app.set_order_status(args.id, status)?;
            println!("work order {} status {}", order.record.id, args.status);
        }
        OrderSubcommands::Cancel(args) => {
            let order = app.cancel_work_order(args.id)?;
            println!("cancelled work order {}", order.record.id);
        }
        OrderSubcommands::Summary(flag) => {
            let rows = app.work_order_summary()?;
            if flag.json {
                print_json(&rows);
            } else {
                ui::print_order_summary(&rows, &*app.lookups()?, app.locale());
            }
        }
        OrderSubcommands::Request(args) => {
            let request = app.add_worker_request(args.id, args.card)?;
            println!(
                "work order {} requests worker {}",
                request.work_order_id, request.worker_id
            );
        }
    }
    Ok(())
}

/// Memberships run a year from the join date unless given explicitly.
fn default_expiration(joined: Date) -> Result<Date, AppError> {
    add_months(joined, 12).ok_or_else(|| {
        AppError::InvalidArgument(format!(
            "a year after {} is past the supported calendar; pass --expires",
            format_date(joined)
        ))
    })
}

fn order_from_args(app: &App, args: OrderAddArgs) -> Result<WorkOrder, AppError> {
    Ok(WorkOrder {
        record: Record::default(),
        employer_id: args.employer,
        paper_order_num: args.paper_order,
        contact_name: args.contact,
        status: app.resolve_lookup(category::ORDER_STATUS, &args.status)?,
        work_site_address1: args.address,
        work_site_address2: args.address2.as_deref().and_then(non_empty),
        city: args.city,
        state: args.state,
        phone: args.phone,
        zipcode: args.zip,
        type_of_work_id: app.resolve_lookup(category::WORK_TYPE, &args.work_type)?,
        english_required: args.english_required,
        english_required_note: args.english_note.as_deref().and_then(non_empty),
        lunch_supplied: args.lunch,
        permanent_placement: args.permanent,
        transport_method_id: app.resolve_lookup(category::TRANSPORT_METHOD, &args.transport)?,
        transport_fee: args.fee,
        transport_fee_extra: args.fee_extra,
        description: args.description.as_deref().and_then(non_empty),
        date_time_of_work: format_datetime(parse_datetime(&args.when)?),
        time_flexible: args.flexible,
    })
}

fn run_assign(app: &App, command: AssignSubcommands) -> Result<(), AppError> {
    match command {
        AssignSubcommands::Add(args) => {
            let assignment = app.create_assignment(app::NewAssignment {
                work_order_id: args.order,
                skill_id: app.resolve_lookup(category::SKILL, &args.skill)?,
                hours: args.hours,
                hourly_wage: args.wage,
                description: args.description,
            })?;
            println!(
                "created assignment {} on work order {}",
                assignment.record.id, assignment.work_order_id
            );
        }
        AssignSubcommands::Dispatch(args) => {
            let assignment = app.dispatch(args.assignment, args.card, args.force)?;
            println!(
                "dispatched card {} to assignment {}",
                args.card, assignment.record.id
            );
        }
        AssignSubcommands::Unassign(args) => {
            let assignment = app.unassign(args.assignment)?;
            println!("assignment {} is open again", assignment.record.id);
        }
        AssignSubcommands::List(args) => {
            let assignments = app.list_assignments(args.order)?;
            if args.json {
                print_json(&assignments);
            } else {
                ui::print_assignments(&assignments);
            }
        }
    }
    Ok(())
}

fn run_signin(app: &App, command: SigninSubcommands) -> Result<(), AppError> {
    match command {
        SigninSubcommands::Add(args) => {
            let outcome = app.sign_in(args.card, args.at.as_deref())?;
            if args.json {
                print_json(&outcome);
            } else {
                ui::print_signin_outcome(&outcome);
            }
        }
        SigninSubcommands::Lottery(args) => {
            let day = args.date.unwrap_or_else(|| format_date(today()));
            let outcome = app.lottery_signin(args.card, &day)?;
            println!("{}", outcome.as_str());
        }
        SigninSubcommands::Delete(args) => {
            app.delete_signin(args.id)?;
            println!("deleted sign-in {}", args.id);
        }
        SigninSubcommands::List(args) => {
            let day = args.date.unwrap_or_else(|| format_date(today()));
            let rows = app.list_signins(&day)?;
            if args.json {
                print_json(&rows);
            } else {
                ui::print_signin_board(&day, &rows);
            }
        }
    }
    Ok(())
}

fn run_activity(app: &App, command: ActivitySubcommands) -> Result<(), AppError> {
    match command {
        ActivitySubcommands::Add(args) => {
            let activity = app.create_activity(Activity {
                record: Record::default(),
                name_id: app.resolve_lookup(category::ACTIVITY_NAME, &args.name)?,
                date_start: args.start,
                date_end: args.end,
                teacher: args.teacher,
                notes: args.notes,
            })?;
            if args.json {
                print_json(&activity);
            } else {
                println!(
                    "created activity {} at {}",
                    activity.record.id, activity.date_start
                );
            }
        }
        ActivitySubcommands::List(args) => {
            let activities = app.list_activities(args.date.as_deref())?;
            if args.json {
                print_json(&activities);
            } else {
                ui::print_activities(&activities, &*app.lookups()?, app.locale());
            }
        }
        ActivitySubcommands::Signin(args) => {
            let signin = app.activity_signin(args.activity, args.card, args.at.as_deref())?;
            println!(
                "card {} signed in to activity {}",
                signin.dwccardnum, signin.activity_id
            );
        }
        ActivitySubcommands::Attendees(args) => {
            let signins = app.list_activity_signins(args.activity)?;
            if args.json {
                print_json(&signins);
            } else {
                ui::print_attendees(&signins);
            }
        }
    }
    Ok(())
}

fn run_event(app: &App, command: EventSubcommands) -> Result<(), AppError> {
    match command {
        EventSubcommands::Add(args) => {
            let event_type = app.resolve_lookup(category::EVENT_TYPE, &args.event_type)?;
            let view = app.create_event(
                WorkerKey::Card(args.card),
                event_type,
                &args.from,
                args.to.as_deref(),
                args.notes.as_deref(),
            )?;
            println!("created event {} {}", view.event.record.id, view.label);
        }
        EventSubcommands::Edit(args) => {
            let event_type = args
                .event_type
                .as_deref()
                .map(|raw| app.resolve_lookup(category::EVENT_TYPE, raw))
                .transpose()?;
            let view = app.edit_event(
                args.id,
                app::EventPatch {
                    event_type,
                    date_from: args.from,
                    date_to: args.to,
                    notes: args.notes,
                },
            )?;
            println!("updated event {} {}", view.event.record.id, view.label);
        }
        EventSubcommands::Delete(args) => {
            app.delete_event(args.id)?;
            println!("deleted event {}", args.id);
        }
        EventSubcommands::List(args) => {
            let events = app.list_events(worker_key(&args.worker))?;
            if args.json {
                print_json(&events);
            } else {
                ui::print_events(&events);
            }
        }
    }
    Ok(())
}

fn run_report(app: &App, command: ReportSubcommands) -> Result<(), AppError> {
    let reports = app.reports()?;
    match command {
        ReportSubcommands::Daily(args) => {
            let data = reports.daily_summary(parse_date(&args.date)?)?;
            if args.json {
                print_json(&data);
            } else {
                ui::print_daily_summary(&data);
            }
        }
        ReportSubcommands::Weekly(args) => {
            let (begin, end) = parse_range(&args.begin, &args.end)?;
            let rows = reports.weekly_summary(begin, end)?;
            if args.json {
                print_json(&rows);
            } else {
                ui::print_weekly_summary(&rows);
            }
        }
        ReportSubcommands::Dispatch(args) => {
            let (begin, end) = parse_range(&args.begin, &args.end)?;
            let rows = reports.dispatch_summary(begin, end)?;
            if args.json {
                print_json(&rows);
            } else {
                ui::print_dispatch_summary(&rows);
            }
        }
        ReportSubcommands::Period(args) => {
            let (begin, end) = parse_range(&args.range.begin, &args.range.end)?;
            let period: Period = args.period.parse()?;
            let rows = reports.period_summary(begin, end, period)?;
            if args.range.json {
                print_json(&rows);
            } else {
                ui::print_dispatch_summary(&rows);
            }
        }
        ReportSubcommands::Activity(args) => {
            let (begin, end) = parse_range(&args.begin, &args.end)?;
            let rows = reports.activity_report(begin, end)?;
            if args.json {
                print_json(&rows);
            } else {
                ui::print_activity_report(&rows);
            }
        }
        ReportSubcommands::Workers(args) => {
            let (begin, end) = parse_range(&args.range.begin, &args.range.end)?;
            let rows = reports.worker_report(begin, end, &args.report_type)?;
            if args.range.json {
                print_json(&rows);
            } else {
                ui::print_worker_report(&rows);
            }
        }
        ReportSubcommands::Employers(args) => {
            let (begin, end) = parse_range(&args.begin, &args.end)?;
            let rows = reports.employer_report(begin, end)?;
            if args.json {
                print_json(&rows);
            } else {
                ui::print_employer_report(&rows);
            }
        }
        ReportSubcommands::Profile(args) => {
            let (begin, end) = parse_range(&args.begin, &args.end)?;
            let profile = reports.client_profile(begin, end)?;
            if args.json {
                print_json(&profile);
            } else {
                ui::print_client_profile(&profile);
            }
        }
    }
    Ok(())
}

fn worker_key(worker: &WorkerRef) -> WorkerKey {
    if worker.by_id {
        WorkerKey::Id(worker.card)
    } else {
        WorkerKey::Card(worker.card)
    }
}

/// `--user`, then `$USER`, then a fixed fallback.
fn resolve_user(explicit: Option<&str>) -> String {
    explicit
        .map(str::to_string)
        .or_else(|| std::env::var("USER").ok())
        .map(|user| user.trim().to_string())
        .filter(|user| !user.is_empty())
        .unwrap_or_else(|| DEFAULT_USER.to_string())
}

fn parse_locale(raw: &str) -> Result<Locale, AppError> {
    raw.parse()
        .map_err(|err: domain::lookup::ParseLocaleError| AppError::InvalidArgument(err.to_string()))
}
