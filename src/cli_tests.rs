use clap::Parser;

use super::{
    AssignSubcommands, Cli, Commands, LookupSubcommands, OrderSubcommands, ReportSubcommands,
    SigninSubcommands, WorkerSubcommands,
};

fn parse(args: &[&str]) -> Cli {
    Cli::parse_from(args)
}

#[test]
fn global_flags_parse_before_subcommand() {
    let cli = parse(&[
        "machete",
        "--db",
        "/tmp/m.sqlite",
        "--locale",
        "es",
        "--user",
        "maria",
        "-vv",
        "doctor",
    ]);
    assert_eq!(cli.db, "/tmp/m.sqlite");
    assert_eq!(cli.locale.as_deref(), Some("es"));
    assert_eq!(cli.user.as_deref(), Some("maria"));
    assert_eq!(cli.verbose, 2);
    assert!(matches!(cli.command, Commands::Doctor(ref args) if !args.json));
}

#[test]
fn verbosity_is_global() {
    let cli = parse(&["machete", "report", "daily", "2024-03-10", "-v"]);
    assert_eq!(cli.verbose, 1);
}

#[test]
fn worker_add_collects_demographics_and_skills() {
    let cli = parse(&[
        "machete",
        "worker",
        "add",
        "30001",
        "Jose",
        "Ramirez",
        "--dob",
        "1980-06-15",
        "--homeless",
        "--skill",
        "G1",
        "--skill",
        "Carpentry",
        "-e",
        "2",
    ]);
    match cli.command {
        Commands::Worker(args) => match args.command {
            WorkerSubcommands::Add(add) => {
                assert_eq!(add.card, 30001);
                assert_eq!(add.first_name, "Jose");
                assert_eq!(add.status, "Active");
                assert_eq!(add.work_type, "DWC");
                assert_eq!(add.date_of_birth.as_deref(), Some("1980-06-15"));
                assert!(add.homeless);
                assert!(!add.refugee);
                assert_eq!(add.skills, vec!["G1", "Carpentry"]);
                assert_eq!(add.english, 2);
            }
            other => panic!("expected Add, got {:?}", other),
        },
        other => panic!("expected Worker, got {:?}", other),
    }
}

#[test]
fn worker_show_accepts_record_id() {
    let cli = parse(&["machete", "worker", "show", "12", "--by-id", "--json"]);
    match cli.command {
        Commands::Worker(args) => match args.command {
            WorkerSubcommands::Show(show) => {
                assert_eq!(show.worker.card, 12);
                assert!(show.worker.by_id);
                assert!(show.json);
            }
            other => panic!("expected Show, got {:?}", other),
        },
        other => panic!("expected Worker, got {:?}", other),
    }
}

#[test]
fn order_add_defaults() {
    let cli = parse(&[
        "machete",
        "order",
        "add",
        "3",
        "--when",
        "2024-03-10 08:00",
        "--contact",
        "Ann",
        "--address",
        "1 Main St",
        "--phone",
        "206-555-0100",
        "--zip",
        "98122",
        "--permanent",
    ]);
    match cli.command {
        Commands::Order(args) => match args.command {
            OrderSubcommands::Add(add) => {
                assert_eq!(add.employer, 3);
                assert_eq!(add.status, "Pending");
                assert_eq!(add.transport, "Worker");
                assert_eq!(add.city, "Seattle");
                assert!(add.permanent);
                assert_eq!(add.fee, 0.0);
            }
            other => panic!("expected Add, got {:?}", other),
        },
        other => panic!("expected Order, got {:?}", other),
    }
}

#[test]
fn assign_dispatch_force_flag_parses() {
    let cli = parse(&["machete", "assign", "dispatch", "5", "30001", "--force"]);
    match cli.command {
        Commands::Assign(args) => match args.command {
            AssignSubcommands::Dispatch(dispatch) => {
                assert_eq!(dispatch.assignment, 5);
                assert_eq!(dispatch.card, 30001);
                assert!(dispatch.force);
            }
            other => panic!("expected Dispatch, got {:?}", other),
        },
        other => panic!("expected Assign, got {:?}", other),
    }
}

#[test]
fn signin_list_date_is_optional() {
    let cli = parse(&["machete", "signin", "list"]);
    match cli.command {
        Commands::Signin(args) => match args.command {
            SigninSubcommands::List(list) => assert!(list.date.is_none()),
            other => panic!("expected List, got {:?}", other),
        },
        other => panic!("expected Signin, got {:?}", other),
    }
}

#[test]
fn report_period_and_worker_type_defaults() {
    let cli = parse(&["machete", "report", "period", "2024-01-01", "2024-03-31"]);
    match cli.command {
        Commands::Report(args) => match args.command {
            ReportSubcommands::Period(period) => {
                assert_eq!(period.range.begin, "2024-01-01");
                assert_eq!(period.period, "month");
            }
            other => panic!("expected Period, got {:?}", other),
        },
        other => panic!("expected Report, got {:?}", other),
    }

    let cli = parse(&[
        "machete", "report", "workers", "2024-01-01", "2024-03-31", "--type", "yearly", "-j",
    ]);
    match cli.command {
        Commands::Report(args) => match args.command {
            ReportSubcommands::Workers(workers) => {
                assert_eq!(workers.report_type, "yearly");
                assert!(workers.range.json);
            }
            other => panic!("expected Workers, got {:?}", other),
        },
        other => panic!("expected Report, got {:?}", other),
    }
}

#[test]
fn lookup_list_category_filter() {
    let cli = parse(&["machete", "lookup", "list", "-c", "skill"]);
    match cli.command {
        Commands::Lookup(args) => match args.command {
            LookupSubcommands::List(list) => {
                assert_eq!(list.category.as_deref(), Some("skill"));
            }
            other => panic!("expected List, got {:?}", other),
        },
        other => panic!("expected Lookup, got {:?}", other),
    }
}

#[test]
fn perf_defaults_to_five_iterations() {
    let cli = parse(&["machete", "perf"]);
    match cli.command {
        Commands::Perf(args) => {
            assert_eq!(args.iterations, 5);
            assert!(!args.strict);
        }
        other => panic!("expected Perf, got {:?}", other),
    }
}

#[test]
fn command_definition_is_consistent() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
}
