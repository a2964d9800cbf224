//! Plain-text rendering of the library's view models.

use care_sync::{DashboardCounts, DoctorView, ListView, MappingView, Notifier, PatientView};

pub fn notices(notifier: &Notifier) {
    for notice in notifier.drain() {
        println!("[{}] {}", notice.severity.label(), notice.message);
    }
}

pub fn counts(counts: &DashboardCounts) {
    println!(
        "Patients: {}   Doctors: {}   Mappings: {}   Users: {}",
        counts.patients, counts.doctors, counts.mappings, counts.users
    );
}

pub fn patients(view: &ListView<PatientView>) {
    match view {
        ListView::Empty { placeholder } => println!("{placeholder}"),
        ListView::Rows(rows) => {
            for row in rows {
                println!("#{:<5} {} ({}, born {})", row.id, row.full_name, row.gender, row.date_of_birth);
                println!("       {} | {}", row.phone_number, row.address);
                if let Some(history) = &row.medical_history {
                    println!("       history: {history}");
                }
                println!("       emergency: {}", row.emergency_contact);
            }
        }
    }
}

pub fn doctors(view: &ListView<DoctorView>) {
    match view {
        ListView::Empty { placeholder } => println!("{placeholder}"),
        ListView::Rows(rows) => {
            for row in rows {
                println!(
                    "#{:<5} {}, {} ({})",
                    row.id, row.full_name, row.specialization, row.availability
                );
                println!("       license {} | {}", row.license_number, row.experience);
                println!("       {} | {}", row.phone_number, row.email);
            }
        }
    }
}

pub fn mappings(view: &ListView<MappingView>) {
    match view {
        ListView::Empty { placeholder } => println!("{placeholder}"),
        ListView::Rows(rows) => {
            for row in rows {
                println!(
                    "#{:<5} {} -> {} (assigned {})",
                    row.id, row.patient_name, row.doctor_name, row.assigned_date
                );
                if let Some(notes) = &row.notes {
                    println!("       notes: {notes}");
                }
            }
        }
    }
}

pub fn help() {
    println!("Commands:");
    println!("  login <email> <password>");
    println!("  register <name> <email> <password> <password2> <y|n>");
    println!("  logout");
    println!("  refresh                      re-fetch all lists and counts");
    println!("  dashboard                    show the current counts");
    println!("  patients | doctors | mappings");
    println!("  mappings-for <patient-id>    doctors assigned to one patient");
    println!("  search patients <query>");
    println!("  search doctors <query>");
    println!("  add-patient first|last|YYYY-MM-DD|M/F/O|phone|address|history|contact|contact-phone");
    println!("  add-doctor first|last|SPEC|license|phone|email|years|M/F/O|address");
    println!("  add-mapping <patient-id> <doctor-id> [notes]");
    println!("  delete patient|doctor|mapping <id>");
    println!("  quit");
}
