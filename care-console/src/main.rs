mod render;

use anyhow::Result;
use care_sync::{
    AdminApp, FileSessionStore, Gender, NewDoctor, NewMapping, NewPatient, QUIET_PERIOD,
    RegisterRequest, SearchDebouncer, Specialization,
};
use chrono::NaiveDate;
use std::io::Write as _;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::info;

/// Initialize tracing based on environment variables.
fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "care_console=info,care_sync=info".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_level(true),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}

type InputLines = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let base_url =
        std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:8000/api".to_string());
    let session_file =
        std::env::var("SESSION_FILE").unwrap_or_else(|_| ".care-session.json".to_string());

    let store = Arc::new(FileSessionStore::new(&session_file));
    let app = Arc::new(AdminApp::new(base_url.clone(), store));
    info!(%base_url, "records console starting");

    app.bootstrap().await;
    render::notices(&app.notifier);
    if let Some(session) = app.session().await {
        println!("Welcome back, {}", session.user.name);
        render::counts(&app.ui().counts);
    } else {
        println!("Not logged in. Type `help` for commands.");
    }

    let patient_search = AdminApp::patient_search(&app);
    let doctor_search = AdminApp::doctor_search(&app);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        if line.is_empty() {
            prompt();
            continue;
        }
        if matches!(line.as_str(), "quit" | "exit") {
            break;
        }
        run_command(&app, &patient_search, &doctor_search, &line, &mut lines).await;
        render::notices(&app.notifier);
        prompt();
    }

    Ok(())
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

async fn run_command(
    app: &Arc<AdminApp>,
    patient_search: &SearchDebouncer,
    doctor_search: &SearchDebouncer,
    line: &str,
    lines: &mut InputLines,
) {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        ["help"] => render::help(),

        ["login", email, password] => {
            let _ = app.login(email, password).await;
            if app.session().await.is_some() {
                render::counts(&app.ui().counts);
            }
        }

        ["register", name, email, password, password2, tc] => {
            let _ = app
                .register(RegisterRequest {
                    name: name.to_string(),
                    email: email.to_string(),
                    password: password.to_string(),
                    password2: password2.to_string(),
                    tc: tc.eq_ignore_ascii_case("y"),
                })
                .await;
        }

        ["logout"] => app.logout().await,

        ["refresh"] => {
            app.refresh_dashboard().await;
            render::counts(&app.ui().counts);
        }

        ["dashboard"] => render::counts(&app.ui().counts),

        ["patients"] => render::patients(&app.ui().patients),
        ["doctors"] => render::doctors(&app.ui().doctors),
        ["mappings"] => render::mappings(&app.ui().mappings),

        ["mappings-for", patient_id] => {
            let Ok(patient_id) = patient_id.parse::<i64>() else {
                println!("usage: mappings-for <patient-id>");
                return;
            };
            match app.mappings.for_patient(patient_id).await {
                Ok(list) => render::mappings(&care_sync::view::mapping_views(&list)),
                Err(e) => println!("Could not load mappings: {e}"),
            }
        }

        ["search", "patients", ..] => {
            patient_search.input(line.splitn(3, ' ').nth(2).unwrap_or(""));
            wait_for_dispatch().await;
            render::patients(&app.ui().patients);
        }

        ["search", "doctors", ..] => {
            doctor_search.input(line.splitn(3, ' ').nth(2).unwrap_or(""));
            wait_for_dispatch().await;
            render::doctors(&app.ui().doctors);
        }

        ["add-patient", ..] => match parse_new_patient(rest_of(line, "add-patient")) {
            Ok(patient) => {
                let _ = app.add_patient(&patient).await;
            }
            Err(message) => println!("{message}"),
        },

        ["add-doctor", ..] => match parse_new_doctor(rest_of(line, "add-doctor")) {
            Ok(doctor) => {
                let _ = app.add_doctor(&doctor).await;
            }
            Err(message) => println!("{message}"),
        },

        ["add-mapping", patient_id, doctor_id, rest @ ..] => {
            let (Ok(patient_id), Ok(doctor_id)) = (patient_id.parse(), doctor_id.parse()) else {
                println!("usage: add-mapping <patient-id> <doctor-id> [notes]");
                return;
            };
            let notes = if rest.is_empty() { None } else { Some(rest.join(" ")) };
            let _ = app
                .add_mapping(&NewMapping { patient_id, doctor_id, notes })
                .await;
        }

        ["delete", entity, id] => {
            let Ok(id) = id.parse::<i64>() else {
                println!("usage: delete patient|doctor|mapping <id>");
                return;
            };
            let pending = match *entity {
                "patient" => app.delete_patient(id),
                "doctor" => app.delete_doctor(id),
                "mapping" => app.delete_mapping(id),
                _ => {
                    println!("usage: delete patient|doctor|mapping <id>");
                    return;
                }
            };
            println!("{} [y/N]", pending.prompt());
            prompt();
            let answer = lines.next_line().await.ok().flatten().unwrap_or_default();
            if answer.trim().eq_ignore_ascii_case("y") {
                let _ = pending.confirm().await;
            } else {
                pending.cancel();
                println!("Cancelled.");
            }
        }

        _ => println!("Unknown command. Type `help` for the list."),
    }
}

/// The debouncer only dispatches after the quiet period; give the request
/// a moment to come back before rendering.
async fn wait_for_dispatch() {
    tokio::time::sleep(QUIET_PERIOD + Duration::from_millis(250)).await;
}

fn rest_of<'a>(line: &'a str, command: &str) -> &'a str {
    line[command.len()..].trim_start()
}

fn parse_gender(raw: &str) -> Result<Gender, String> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "M" | "MALE" => Ok(Gender::Male),
        "F" | "FEMALE" => Ok(Gender::Female),
        "O" | "OTHER" => Ok(Gender::Other),
        other => Err(format!("unknown gender `{other}` (expected M, F or O)")),
    }
}

fn parse_new_patient(rest: &str) -> Result<NewPatient, String> {
    let fields: Vec<&str> = rest.split('|').map(str::trim).collect();
    let &[first, last, dob, gender, phone, address, history, contact, contact_phone] =
        fields.as_slice()
    else {
        return Err(
            "usage: add-patient first|last|YYYY-MM-DD|M/F/O|phone|address|history|contact|contact-phone"
                .to_string(),
        );
    };

    let date_of_birth = NaiveDate::parse_from_str(dob, "%Y-%m-%d")
        .map_err(|e| format!("invalid date of birth `{dob}`: {e}"))?;

    Ok(NewPatient {
        first_name: first.to_string(),
        last_name: last.to_string(),
        date_of_birth,
        gender: parse_gender(gender)?,
        phone_number: phone.to_string(),
        address: address.to_string(),
        medical_history: if history.is_empty() { None } else { Some(history.to_string()) },
        emergency_contact: contact.to_string(),
        emergency_phone: contact_phone.to_string(),
    })
}

fn parse_new_doctor(rest: &str) -> Result<NewDoctor, String> {
    let fields: Vec<&str> = rest.split('|').map(str::trim).collect();
    let &[first, last, specialization, license, phone, email, years, gender, address] =
        fields.as_slice()
    else {
        return Err(
            "usage: add-doctor first|last|SPEC|license|phone|email|years|M/F/O|address".to_string(),
        );
    };

    let specialization = Specialization::from_code(specialization)
        .ok_or_else(|| format!("unknown specialization code `{specialization}`"))?;
    let experience_years: u32 = years
        .parse()
        .map_err(|_| format!("invalid experience years `{years}`"))?;

    Ok(NewDoctor {
        first_name: first.to_string(),
        last_name: last.to_string(),
        specialization,
        license_number: license.to_string(),
        phone_number: phone.to_string(),
        email: email.to_string(),
        experience_years,
        gender: parse_gender(gender)?,
        address: address.to_string(),
    })
}
