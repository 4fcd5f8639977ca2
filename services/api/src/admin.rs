use clap::Args;
use contact_intake::config::{AppConfig, ConfigError};
use contact_intake::error::AppError;
use contact_intake::submissions::{
    JsonFileSubmissionStore, QueryService, StatusUpdate, StatusUpdater, Submission,
    SubmissionPage, SubmissionQuery,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct ListArgs {
    /// Only show submissions with this status
    #[arg(long)]
    pub(crate) status: Option<String>,
    /// Inclusive lower timestamp bound (ISO-8601)
    #[arg(long)]
    pub(crate) start_date: Option<String>,
    /// Inclusive upper timestamp bound (ISO-8601)
    #[arg(long)]
    pub(crate) end_date: Option<String>,
    /// Page size (defaults to 50)
    #[arg(long)]
    pub(crate) limit: Option<String>,
    /// Continuation token printed by a previous page
    #[arg(long)]
    pub(crate) cursor: Option<String>,
    /// Print the raw page as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
    /// Store file to read; defaults to APP_STORE_PATH
    #[arg(long)]
    pub(crate) store: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct SetStatusArgs {
    /// Submission identifier
    pub(crate) id: String,
    /// Creation timestamp of the submission
    #[arg(long)]
    pub(crate) timestamp: String,
    /// New status: new, viewed, responded, completed, or spam
    #[arg(long)]
    pub(crate) status: String,
    /// Store file to update; defaults to APP_STORE_PATH
    #[arg(long)]
    pub(crate) store: Option<PathBuf>,
}

pub(crate) fn run_list(args: ListArgs) -> Result<(), AppError> {
    let store = open_admin_store(args.store)?;
    let query = SubmissionQuery {
        status: args.status,
        start_date: args.start_date,
        end_date: args.end_date,
        limit: args.limit,
        last_evaluated_key: args.cursor,
    };

    let page = QueryService::new(store).list(query)?;
    if args.json {
        let rendered = serde_json::to_string_pretty(&page)
            .map_err(|err| AppError::Io(std::io::Error::other(err)))?;
        println!("{rendered}");
    } else {
        print!("{}", render_page(&page));
    }
    Ok(())
}

pub(crate) fn run_set_status(args: SetStatusArgs) -> Result<(), AppError> {
    let store = open_admin_store(args.store)?;
    let updated = StatusUpdater::new(store).update(
        &args.id,
        Some(args.timestamp.as_str()),
        &StatusUpdate::new(args.status),
    )?;

    println!(
        "Submission {} ({}) is now {}",
        updated.id, updated.timestamp, updated.status
    );
    Ok(())
}

fn open_admin_store(
    explicit: Option<PathBuf>,
) -> Result<Arc<JsonFileSubmissionStore>, AppError> {
    let path = match explicit {
        Some(path) => path,
        None => AppConfig::load()?
            .store
            .path
            .ok_or(ConfigError::MissingVar("APP_STORE_PATH"))?,
    };
    Ok(Arc::new(JsonFileSubmissionStore::open(path)?))
}

fn render_page(page: &SubmissionPage) -> String {
    let mut out = String::new();
    if page.submissions.is_empty() {
        out.push_str("No submissions found\n");
    } else {
        out.push_str(&format!("Submissions ({})\n", page.submissions.len()));
        for submission in &page.submissions {
            out.push_str(&render_row(submission));
        }
    }

    if let Some(pagination) = &page.pagination {
        out.push_str(&format!("\nNext page: --cursor {}\n", pagination.next_token));
    }
    out
}

fn render_row(submission: &Submission) -> String {
    let company = if submission.company.is_empty() {
        "-"
    } else {
        submission.company.as_str()
    };
    format!(
        "- {} | {} | {:<9} | {} <{}> | {}\n",
        submission.timestamp,
        submission.id,
        submission.status.label(),
        submission.name,
        submission.email,
        company
    )
}
