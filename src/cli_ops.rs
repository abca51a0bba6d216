use clap::{Args, Subcommand};

#[derive(Debug, Args)]
#[command(
    about = "Worker commands.",
    long_about = "Register members, change their status and renew memberships."
)]
pub struct WorkerArgs {
    #[command(subcommand)]
    pub command: WorkerSubcommands,
}

#[derive(Debug, Subcommand)]
pub enum WorkerSubcommands {
    #[command(about = "Register a new member.")]
    Add(WorkerAddArgs),
    #[command(about = "Show one member by card number.")]
    Show(WorkerShowArgs),
    #[command(about = "List members.")]
    List(WorkerListArgs),
    #[command(about = "Change a member's status.")]
    Status(WorkerStatusArgs),
    #[command(about = "Move a member's expiration date.")]
    Renew(WorkerRenewArgs),
}

/// Addresses a member by card number, or by record id with `--by-id`.
#[derive(Debug, Args)]
pub struct WorkerRef {
    #[arg(help = "Member card number.")]
    pub card: i64,

    #[arg(long, help = "Treat the number as a record id instead of a card number.")]
    pub by_id: bool,
}

#[derive(Debug, Args)]
pub struct WorkerAddArgs {
    #[arg(help = "Member card number.")]
    pub card: i64,
    #[arg(help = "First name.")]
    pub first_name: String,
    #[arg(help = "Last name.")]
    pub last_name: String,

    #[arg(short = 's', long, default_value = "Active", help = "Member status.")]
    pub status: String,

    #[arg(long, help = "Membership date (defaults to today).")]
    pub joined: Option<String>,

    #[arg(long, help = "Expiration date (defaults to one year after joining).")]
    pub expires: Option<String>,

    #[arg(long = "dob", help = "Date of birth.")]
    pub date_of_birth: Option<String>,

    #[arg(short = 't', long, default_value = "DWC", help = "Type of work.")]
    pub work_type: String,

    #[arg(long, help = "Marital status.")]
    pub marital: Option<String>,

    #[arg(long, help = "Lives with children.")]
    pub children: bool,

    #[arg(long, help = "Member is homeless.")]
    pub homeless: bool,

    #[arg(long, help = "Member is an immigrant or refugee.")]
    pub refugee: bool,

    #[arg(long, help = "Member has a disability.")]
    pub disabled: bool,

    #[arg(long, help = "Race or ethnicity.")]
    pub race: Option<String>,

    #[arg(long, help = "Income bracket.")]
    pub income: Option<String>,

    #[arg(long, help = "Gender.")]
    pub gender: Option<String>,

    #[arg(short = 'e', long, default_value_t = 0, help = "English level, 0 to 5.")]
    pub english: i64,

    #[arg(short = 'z', long, help = "Home zip code.")]
    pub zip: Option<String>,

    #[arg(
        short = 'k',
        long = "skill",
        num_args = 1,
        help = "Skill; repeat up to three times."
    )]
    pub skills: Vec<String>,

    #[arg(short = 'j', long, help = "Emit JSON output.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct WorkerShowArgs {
    #[command(flatten)]
    pub worker: WorkerRef,

    #[arg(short = 'j', long, help = "Emit JSON output.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct WorkerListArgs {
    #[arg(short = 's', long, help = "Only members with this status.")]
    pub status: Option<String>,

    #[arg(short = 'j', long, help = "Emit JSON output.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct WorkerStatusArgs {
    #[command(flatten)]
    pub worker: WorkerRef,

    #[arg(help = "New member status.")]
    pub status: String,
}

#[derive(Debug, Args)]
pub struct WorkerRenewArgs {
    #[command(flatten)]
    pub worker: WorkerRef,

    #[arg(help = "New expiration date.")]
    pub expires: String,
}

#[derive(Debug, Args)]
#[command(about = "Employer commands.")]
pub struct EmployerArgs {
    #[command(subcommand)]
    pub command: EmployerSubcommands,
}

#[derive(Debug, Subcommand)]
pub enum EmployerSubcommands {
    #[command(about = "Register an employer.")]
    Add(EmployerAddArgs),
    #[command(about = "List employers.")]
    List(JsonFlag),
}

#[derive(Debug, Args)]
pub struct EmployerAddArgs {
    #[arg(help = "Employer name.")]
    pub name: String,

    #[arg(short = 'p', long, help = "Phone number.")]
    pub phone: Option<String>,

    #[arg(short = 'z', long, help = "Zip code.")]
    pub zip: Option<String>,
}

#[derive(Debug, Args)]
pub struct JsonFlag {
    #[arg(short = 'j', long, help = "Emit JSON output.")]
    pub json: bool,
}

#[derive(Debug, Args)]
#[command(
    about = "Work order commands.",
    long_about = "Create work orders, move them through their statuses and record worker requests."
)]
pub struct OrderArgs {
    #[command(subcommand)]
    pub command: OrderSubcommands,
}

#[derive(Debug, Subcommand)]
pub enum OrderSubcommands {
    #[command(about = "Create a work order.")]
    Add(OrderAddArgs),
    #[command(about = "Show a work order with its assignments and requests.")]
    Show(OrderShowArgs),
    #[command(about = "List work orders, optionally for one day.")]
    List(OrderListArgs),
    #[command(about = "Change a work order's status.")]
    Status(OrderStatusArgs),
    #[command(about = "Cancel a work order.")]
    Cancel(OrderIdArgs),
    #[command(about = "Count work orders per day and status.")]
    Summary(JsonFlag),
    #[command(about = "Record that the employer asked for a specific member.")]
    Request(OrderRequestArgs),
}

#[derive(Debug, Args)]
pub struct OrderAddArgs {
    #[arg(help = "Employer id.")]
    pub employer: i64,

    #[arg(short = 'w', long, help = "Date and time of the work.")]
    pub when: String,

    #[arg(long, help = "Contact name at the work site.")]
    pub contact: String,

    #[arg(short = 'a', long, help = "Work site street address.")]
    pub address: String,

    #[arg(long, help = "Second address line.")]
    pub address2: Option<String>,

    #[arg(long, default_value = "Seattle", help = "City.")]
    pub city: String,

    #[arg(long, default_value = "WA", help = "State.")]
    pub state: String,

    #[arg(short = 'p', long, help = "Contact phone.")]
    pub phone: String,

    #[arg(short = 'z', long, help = "Work site zip code.")]
    pub zip: String,

    #[arg(short = 's', long, default_value = "Pending", help = "Initial order status.")]
    pub status: String,

    #[arg(short = 't', long, default_value = "DWC", help = "Type of work.")]
    pub work_type: String,

    #[arg(long, default_value = "Worker", help = "Transport method.")]
    pub transport: String,

    #[arg(long, default_value_t = 0.0, help = "Transport fee.")]
    pub fee: f64,

    #[arg(long, default_value_t = 0.0, help = "Extra transport fee.")]
    pub fee_extra: f64,

    #[arg(long, help = "Order is a permanent placement.")]
    pub permanent: bool,

    #[arg(long, help = "English is required on site.")]
    pub english_required: bool,

    #[arg(long, help = "Note on the English requirement.")]
    pub english_note: Option<String>,

    #[arg(long, help = "Employer supplies lunch.")]
    pub lunch: bool,

    #[arg(long, help = "Start time is flexible.")]
    pub flexible: bool,

    #[arg(long, help = "Paper order number.")]
    pub paper_order: Option<i64>,

    #[arg(long = "desc", help = "Description of the work.")]
    pub description: Option<String>,

    #[arg(short = 'j', long, help = "Emit JSON output.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct OrderShowArgs {
    #[arg(help = "Work order id.")]
    pub id: i64,

    #[arg(short = 'j', long, help = "Emit JSON output.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct OrderListArgs {
    #[arg(long, help = "Only orders for this day.")]
    pub date: Option<String>,

    #[arg(short = 'j', long, help = "Emit JSON output.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct OrderStatusArgs {
    #[arg(help = "Work order id.")]
    pub id: i64,
    #[arg(help = "New order status.")]
    pub status: String,
}

#[derive(Debug, Args)]
pub struct OrderIdArgs {
    #[arg(help = "Work order id.")]
    pub id: i64,
}

#[derive(Debug, Args)]
pub struct OrderRequestArgs {
    #[arg(help = "Work order id.")]
    pub id: i64,
    #[arg(help = "Requested member's card number.")]
    pub card: i64,
}

#[derive(Debug, Args)]
#[command(about = "Assignment commands.")]
pub struct AssignArgs {
    #[command(subcommand)]
    pub command: AssignSubcommands,
}

#[derive(Debug, Subcommand)]
pub enum AssignSubcommands {
    #[command(about = "Add an open assignment slot to a work order.")]
    Add(AssignAddArgs),
    #[command(about = "Dispatch a signed-in member to an assignment.")]
    Dispatch(AssignDispatchArgs),
    #[command(about = "Take the member off an assignment.")]
    Unassign(AssignmentIdArgs),
    #[command(about = "List a work order's assignments.")]
    List(AssignListArgs),
}

#[derive(Debug, Args)]
pub struct AssignAddArgs {
    #[arg(help = "Work order id.")]
    pub order: i64,

    #[arg(short = 'k', long, help = "Skill needed.")]
    pub skill: String,

    #[arg(long, help = "Hours of work.")]
    pub hours: i64,

    #[arg(short = 'w', long, help = "Hourly wage.")]
    pub wage: f64,

    #[arg(long = "desc", help = "Description of the task.")]
    pub description: Option<String>,
}

#[derive(Debug, Args)]
pub struct AssignDispatchArgs {
    #[arg(help = "Assignment id.")]
    pub assignment: i64,
    #[arg(help = "Member card number.")]
    pub card: i64,

    #[arg(short = 'f', long, help = "Dispatch even without a sign-in for the day.")]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct AssignmentIdArgs {
    #[arg(help = "Assignment id.")]
    pub assignment: i64,
}

#[derive(Debug, Args)]
pub struct AssignListArgs {
    #[arg(help = "Work order id.")]
    pub order: i64,

    #[arg(short = 'j', long, help = "Emit JSON output.")]
    pub json: bool,
}

#[derive(Debug, Args)]
#[command(about = "Sign-in commands.")]
pub struct SigninArgs {
    #[command(subcommand)]
    pub command: SigninSubcommands,
}

#[derive(Debug, Subcommand)]
pub enum SigninSubcommands {
    #[command(about = "Sign a member in for the day.")]
    Add(SigninAddArgs),
    #[command(about = "Stamp the lottery time on a member's sign-in.")]
    Lottery(SigninLotteryArgs),
    #[command(about = "Delete a sign-in that is not linked to an assignment.")]
    Delete(SigninIdArgs),
    #[command(about = "Show the sign-in board for a day.")]
    List(SigninListArgs),
}

#[derive(Debug, Args)]
pub struct SigninAddArgs {
    #[arg(help = "Member card number.")]
    pub card: i64,

    #[arg(long, help = "Sign-in time (defaults to now).")]
    pub at: Option<String>,

    #[arg(short = 'j', long, help = "Emit JSON output.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct SigninLotteryArgs {
    #[arg(help = "Member card number.")]
    pub card: i64,

    #[arg(long, help = "Sign-in day (defaults to today).")]
    pub date: Option<String>,
}

#[derive(Debug, Args)]
pub struct SigninIdArgs {
    #[arg(help = "Sign-in id.")]
    pub id: i64,
}

#[derive(Debug, Args)]
pub struct SigninListArgs {
    #[arg(long, help = "Day to show (defaults to today).")]
    pub date: Option<String>,

    #[arg(short = 'j', long, help = "Emit JSON output.")]
    pub json: bool,
}

#[derive(Debug, Args)]
#[command(about = "Activity commands.")]
pub struct ActivityArgs {
    #[command(subcommand)]
    pub command: ActivitySubcommands,
}

#[derive(Debug, Subcommand)]
pub enum ActivitySubcommands {
    #[command(about = "Schedule a class or other activity.")]
    Add(ActivityAddArgs),
    #[command(about = "List activities, optionally for one day.")]
    List(ActivityListArgs),
    #[command(about = "Sign a card in to an activity.")]
    Signin(ActivitySigninArgs),
    #[command(about = "List who attended an activity.")]
    Attendees(ActivityAttendeesArgs),
}

#[derive(Debug, Args)]
pub struct ActivityAddArgs {
    #[arg(help = "Activity name.")]
    pub name: String,
    #[arg(help = "Start time.")]
    pub start: String,
    #[arg(help = "End time.")]
    pub end: String,

    #[arg(long, help = "Teacher.")]
    pub teacher: Option<String>,

    #[arg(long, help = "Notes.")]
    pub notes: Option<String>,

    #[arg(short = 'j', long, help = "Emit JSON output.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ActivityListArgs {
    #[arg(long, help = "Only activities starting on this day.")]
    pub date: Option<String>,

    #[arg(short = 'j', long, help = "Emit JSON output.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ActivitySigninArgs {
    #[arg(help = "Activity id.")]
    pub activity: i64,
    #[arg(help = "Card number.")]
    pub card: i64,

    #[arg(long, help = "Sign-in time (defaults to the activity start).")]
    pub at: Option<String>,
}

#[derive(Debug, Args)]
pub struct ActivityAttendeesArgs {
    #[arg(help = "Activity id.")]
    pub activity: i64,

    #[arg(short = 'j', long, help = "Emit JSON output.")]
    pub json: bool,
}

#[derive(Debug, Args)]
#[command(about = "Event commands.")]
pub struct EventArgs {
    #[command(subcommand)]
    pub command: EventSubcommands,
}

#[derive(Debug, Subcommand)]
pub enum EventSubcommands {
    #[command(about = "Record an event for a member.")]
    Add(EventAddArgs),
    #[command(about = "Edit an event.")]
    Edit(EventEditArgs),
    #[command(about = "Delete an event.")]
    Delete(EventIdArgs),
    #[command(about = "List a member's events.")]
    List(EventListArgs),
}

#[derive(Debug, Args)]
pub struct EventAddArgs {
    #[arg(help = "Member card number.")]
    pub card: i64,
    #[arg(help = "Event type.")]
    pub event_type: String,
    #[arg(help = "First day of the event.")]
    pub from: String,

    #[arg(long, help = "Last day of the event.")]
    pub to: Option<String>,

    #[arg(long, help = "Notes.")]
    pub notes: Option<String>,
}

#[derive(Debug, Args)]
pub struct EventEditArgs {
    #[arg(help = "Event id.")]
    pub id: i64,

    #[arg(short = 't', long = "type", help = "New event type.")]
    pub event_type: Option<String>,

    #[arg(long, help = "New first day.")]
    pub from: Option<String>,

    #[arg(long, help = "New last day.")]
    pub to: Option<String>,

    #[arg(long, help = "New notes.")]
    pub notes: Option<String>,
}

#[derive(Debug, Args)]
pub struct EventIdArgs {
    #[arg(help = "Event id.")]
    pub id: i64,
}

#[derive(Debug, Args)]
pub struct EventListArgs {
    #[command(flatten)]
    pub worker: WorkerRef,

    #[arg(short = 'j', long, help = "Emit JSON output.")]
    pub json: bool,
}

#[derive(Debug, Args)]
#[command(
    about = "Report commands.",
    long_about = "Dispatch, activity, membership and employer reports over a date range. Ranges are inclusive."
)]
pub struct ReportArgs {
    #[command(subcommand)]
    pub command: ReportSubcommands,
}

#[derive(Debug, Subcommand)]
pub enum ReportSubcommands {
    #[command(about = "Dispatch totals for one day.")]
    Daily(ReportDayArgs),
    #[command(about = "Dispatch totals for every day of a range.")]
    Weekly(ReportRangeArgs),
    #[command(about = "Dispatch counts per day of a range.")]
    Dispatch(ReportRangeArgs),
    #[command(about = "Dispatch totals grouped by week, month, quarter or year.")]
    Period(ReportPeriodArgs),
    #[command(about = "Class attendance per activity.")]
    Activity(ReportRangeArgs),
    #[command(about = "Member counts per window (weekly, monthly or yearly).")]
    Workers(ReportWorkersArgs),
    #[command(about = "Jobs and employers per zip code.")]
    Employers(ReportRangeArgs),
    #[command(about = "Demographic profile of members in the program.")]
    Profile(ReportRangeArgs),
}

#[derive(Debug, Args)]
pub struct ReportDayArgs {
    #[arg(help = "Day to report on.")]
    pub date: String,

    #[arg(short = 'j', long, help = "Emit JSON output.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ReportRangeArgs {
    #[arg(help = "First day of the range.")]
    pub begin: String,
    #[arg(help = "Last day of the range.")]
    pub end: String,

    #[arg(short = 'j', long, help = "Emit JSON output.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ReportPeriodArgs {
    #[command(flatten)]
    pub range: ReportRangeArgs,

    #[arg(
        short = 'p',
        long,
        default_value = "month",
        help = "Grouping: week, month, quarter or year."
    )]
    pub period: String,
}

#[derive(Debug, Args)]
pub struct ReportWorkersArgs {
    #[command(flatten)]
    pub range: ReportRangeArgs,

    #[arg(
        short = 't',
        long = "type",
        default_value = "monthly",
        help = "Window layout: weekly, monthly or yearly."
    )]
    pub report_type: String,
}
