use crate::infra::{seed_demo_users, DEMO_USERS};
use bridge::clock::{Clock, FixedClock, SystemClock};
use bridge::config::RankingConfig;
use bridge::error::AppError;
use bridge::listings::{
    ListingInput, ListingService, MemoryListingStore, RecruitmentInput, UserId,
};
use chrono::{Duration, NaiveDateTime};
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Reference time for deadlines (YYYY-MM-DDTHH:MM:SS). Defaults to now.
    #[arg(long, value_parser = crate::infra::parse_datetime)]
    pub(crate) now: Option<NaiveDateTime>,
    /// Number of listings to publish before ranking.
    #[arg(long, default_value_t = 25)]
    pub(crate) listings: usize,
    /// Cap applied to the most-bookmarked ranking.
    #[arg(long, default_value_t = bridge::config::DEFAULT_TOP_PROJECTS_LIMIT)]
    pub(crate) top: usize,
}

type DemoService = ListingService<MemoryListingStore, FixedClock>;

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        now,
        listings,
        top,
    } = args;

    let now = now.unwrap_or_else(|| SystemClock.now());
    let store = Arc::new(MemoryListingStore::new());
    let users = seed_demo_users(&store)?;
    let clock = Arc::new(FixedClock::new(now));
    let service = ListingService::new(
        store,
        clock.clone(),
        RankingConfig {
            top_projects_limit: top.max(1),
        },
    );

    println!("Bridge listing demo (now = {now})");
    let [owner, applicant, rival, fan] = match users.as_slice() {
        [a, b, c, d] => [*a, *b, *c, *d],
        _ => return Ok(()),
    };

    let mut published = Vec::with_capacity(listings);
    for n in 1..=listings {
        let input = demo_listing(format!("제목{n}"), now + Duration::days(n as i64));
        published.push(service.create(owner, input)?);
    }
    println!(
        "- {} published {} listings",
        DEMO_USERS[0].0,
        published.len()
    );
    let Some(&headline) = published.first() else {
        println!("Nothing to demonstrate without listings");
        return Ok(());
    };

    render_applications(&service, headline, applicant, rival)?;

    println!("\nScraps");
    for user in [applicant, rival, fan] {
        let view = service.scrap(user, headline)?;
        println!("  user {user}: {} ({} total)", view.scrap, view.bookmarks_num);
    }
    let view = service.scrap(fan, headline)?;
    println!("  user {fan}: {} ({} total)", view.scrap, view.bookmarks_num);
    if let Some(&runner_up) = published.get(1) {
        service.scrap(fan, runner_up)?;
    }

    println!("\nMost bookmarked");
    for view in service.top_projects()? {
        println!("  - {} [{} scraps] due {}", view.title, view.bookmarks_num, view.due_date);
    }

    let closed = service.close(headline)?;
    println!("\nClosed '{}' at {}", closed.title, closed.due_date);
    if let Err(err) = service.close(headline) {
        println!("  Second close refused: {err}");
    }

    clock.advance(Duration::days(3));
    println!("\nClosing soon (three days later)");
    for view in service.imminent_projects(fan)?.iter().take(5) {
        let marker = if view.is_scrap { " *" } else { "" };
        println!("  - {} due {}{marker}", view.title, view.due_date);
    }

    println!("\nDiscovery");
    println!("  search '제목1': {} hits", service.search(Some(fan), "제목1")?.len());
    service.search(Some(fan), "제목2")?;
    let recent: Vec<String> = service
        .recent_searches(fan)?
        .into_iter()
        .map(|view| view.search_word)
        .collect();
    println!("  user {fan} recent searches: {}", recent.join(", "));
    println!(
        "  filter BACKEND + JAVA: {} hits",
        service.filter("BACKEND", &["JAVA"])?.len()
    );
    println!(
        "  {}'s BACKEND listings: {}",
        DEMO_USERS[0].0,
        service.list_by_owner_and_field(owner, "BACKEND")?.len()
    );

    Ok(())
}

fn render_applications(
    service: &DemoService,
    listing: bridge::listings::ListingId,
    applicant: UserId,
    rival: UserId,
) -> Result<(), AppError> {
    println!("\nApplications");
    service.apply(applicant, listing)?;
    service.apply(rival, listing)?;
    if let Err(err) = service.apply(rival, listing) {
        println!("  Duplicate apply refused: {err}");
    }

    println!("  Pending applicants:");
    for summary in service.list_applicants(listing)? {
        let career = summary.career.as_deref().unwrap_or("-");
        println!(
            "    - {} ({}) career: {career}",
            summary.name,
            summary.fields.join(", ")
        );
    }

    service.accept_apply(listing, applicant)?;
    service.reject_apply(listing, rival)?;
    for user in [applicant, rival] {
        for view in service.list_my_applications(user)? {
            println!("  user {user} -> '{}': {}", view.title, view.stage);
        }
    }
    Ok(())
}

fn demo_listing(title: String, due_date: NaiveDateTime) -> ListingInput {
    ListingInput {
        overview: format!("{title} overview"),
        title,
        due_date,
        start_date: due_date + Duration::days(7),
        end_date: due_date + Duration::days(67),
        recruit: vec![
            RecruitmentInput {
                field: "BACKEND".to_string(),
                recruit_num: 3,
                skills: vec!["JAVA".to_string(), "SPRINGBOOT".to_string()],
                requirement: "아무거나".to_string(),
            },
            RecruitmentInput {
                field: "FRONTEND".to_string(),
                recruit_num: 1,
                skills: vec!["REACT".to_string()],
                requirement: String::new(),
            },
        ],
        tag_limit: Vec::new(),
        meeting_way: "Offline".to_string(),
        stage: "Before Start".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 14)
            .and_then(|date| date.and_hms_opt(12, 0, 0))
            .expect("valid timestamp")
    }

    #[test]
    fn demo_completes_with_defaults() {
        let args = DemoArgs {
            now: Some(fixed_now()),
            listings: 25,
            top: 20,
        };
        run_demo(args).expect("demo runs");
    }

    #[test]
    fn demo_tolerates_empty_catalogue() {
        let args = DemoArgs {
            now: Some(fixed_now()),
            listings: 0,
            top: 0,
        };
        run_demo(args).expect("demo runs");
    }
}
