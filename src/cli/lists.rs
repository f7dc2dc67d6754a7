//! The `lists` command: search the reading lists for a course.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::api::{AlmaClient, HttpTransport};
use crate::cache::ListCache;
use crate::codes::CodeResolver;
use crate::lists::ListAggregator;
use crate::models::LocalCourse;

/// Arguments for `leganto lists`.
#[derive(Debug, Args)]
pub struct ListsArgs {
    /// Local course id.
    #[arg(long, default_value_t = 0)]
    pub id: i64,

    /// Course short name, e.g. BIOL101-Fall.
    #[arg(long, default_value = "")]
    pub shortname: String,

    /// Course id number.
    #[arg(long, default_value = "")]
    pub idnumber: String,
}

pub async fn execute<T: HttpTransport, C: ListCache>(
    client: &AlmaClient<T, C>,
    args: &ListsArgs,
) -> Result<()> {
    let course = LocalCourse {
        id: args.id,
        shortname: args.shortname.clone(),
        idnumber: args.idnumber.clone(),
        fullname: String::new(),
    };

    let resolver = CodeResolver::new(client.config());
    let aggregator = ListAggregator::new(client, &resolver);
    let lists = aggregator.fetch_lists(&course).await?;

    if lists.is_empty() {
        println!("No reading lists found for this course.");
        return Ok(());
    }

    for list in &lists {
        println!(
            "{}  {}  (course {})",
            list.name.trim().bold(),
            list.id.dimmed(),
            list.course_id.dimmed()
        );
    }
    println!();
    println!("{} reading list(s) found", lists.len());

    Ok(())
}
