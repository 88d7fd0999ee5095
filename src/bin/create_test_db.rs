use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::OffsetDateTime;

use warikan_rs::{
    GroupName, MemberName, NewExpense, create_expense, create_group, create_member, initialize_db,
};

/// A utility for creating a test database for the web server of warikan_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test group...");

    let now = OffsetDateTime::now_utc();
    let group = create_group(GroupName::new("Hakone Trip")?, now, &conn)?;

    let mut members = Vec::new();
    for name in ["Aki", "Ben", "Chie", "Dan"] {
        members.push(create_member(group.id, MemberName::new(name)?, &conn)?);
    }

    println!("Creating test expenses...");

    let ids: Vec<_> = members.iter().map(|member| member.id).collect();
    let expenses = [
        ("Ryokan", 48_000, ids[0], ids.clone()),
        ("Romancecar tickets", 9_280, ids[1], ids.clone()),
        ("Dinner", 10_000, ids[2], vec![ids[0], ids[1], ids[2]]),
        ("Onsen entry", 2_600, ids[3], vec![ids[2], ids[3]]),
    ];

    for (description, amount, payer_id, target_ids) in expenses {
        let new_expense =
            NewExpense::new(group.id, description, amount, payer_id, &target_ids, &members)?;
        create_expense(new_expense, now, &conn)?;
    }

    println!("Success!");

    Ok(())
}
