//! Course Catalog CLI
//!
//! Command-line tool that reads and edits the catalog file directly, without
//! going through the API server.
//!
//! # Usage
//!
//! ```bash
//! catalog --help
//! catalog list
//! catalog show CS101
//! catalog add --code CS101 --name "Intro" --instructor "Dr. X"
//! catalog --file /srv/course_catalog.json delete CS101
//! ```

#![deny(unsafe_code)]

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use shared::models::{Course, CourseFields};
use shared::service::VALIDATION_MESSAGE;
use shared::storage::{CatalogStore, JsonFileCatalogStore};
use std::io::Write;
use std::path::PathBuf;

/// Course catalog CLI - inspect and edit the catalog file
#[derive(Parser)]
#[command(name = "catalog")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path of the catalog file
    #[arg(
        short,
        long,
        env = "CATALOG_FILE",
        default_value = "course_catalog.json"
    )]
    file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every course
    List,
    /// Print the first course with a code
    Show {
        /// Course code
        code: String,
    },
    /// Append a course
    Add(AddArgs),
    /// Remove every course with a code
    Delete {
        /// Course code
        code: String,
    },
}

#[derive(Args)]
struct AddArgs {
    #[arg(long)]
    code: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    instructor: String,
    #[arg(long, default_value = "")]
    semester: String,
    #[arg(long, default_value = "")]
    schedule: String,
    #[arg(long, default_value = "")]
    classroom: String,
    #[arg(long, default_value = "")]
    prerequisites: String,
    #[arg(long, default_value = "")]
    grading: String,
    #[arg(long, default_value = "")]
    description: String,
}

impl From<AddArgs> for CourseFields {
    fn from(args: AddArgs) -> Self {
        Self {
            code: args.code,
            name: args.name,
            instructor: args.instructor,
            semester: args.semester,
            schedule: args.schedule,
            classroom: args.classroom,
            prerequisites: args.prerequisites,
            grading: args.grading,
            description: args.description,
        }
    }
}

fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    let store = JsonFileCatalogStore::new(cli.file);
    tracing::debug!(path = %store.path().display(), "Using catalog file");

    match cli.command {
        Commands::List => {
            let courses = store.load_all()?;
            writeln!(out, "{}", serde_json::to_string_pretty(&courses)?)?;
        }
        Commands::Show { code } => {
            let Some(course) = store.find_by_code(&code)? else {
                bail!("No course found with code '{code}'.");
            };
            writeln!(out, "{}", serde_json::to_string_pretty(&course)?)?;
        }
        Commands::Add(args) => {
            let course = Course::from(CourseFields::from(args));
            if course.validate_course().is_err() {
                bail!(VALIDATION_MESSAGE);
            }
            let name = course.name.clone();
            store.append_one(course)?;
            writeln!(out, "Course '{name}' added successfully!")?;
        }
        Commands::Delete { code } => {
            let removed = store.delete_by_code(&code)?;
            tracing::debug!(code, removed, "Deleted courses");
            writeln!(out, "Course with code '{code}' deleted successfully!")?;
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    run(cli, &mut std::io::stdout().lock())
}
