//! Demo dataset for an empty database.

use chrono::{TimeDelta, Utc};
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, SeedableRng};
use sqlx::PgPool;

use crate::db;
use crate::models::{
    Consultant, EntryType, NewConsultant, NewProject, NewProjectStatus, NewTimeEntry, Project,
};

const ROSTER: [(&str, &str); 8] = [
    ("Ada", "Lovelace"),
    ("Grace", "Hopper"),
    ("Alan", "Turing"),
    ("Edsger", "Dijkstra"),
    ("Barbara", "Liskov"),
    ("Donald", "Knuth"),
    ("Frances", "Allen"),
    ("Ken", "Thompson"),
];

const ROLES: [&str; 3] = ["administrator", "manager", "consultant"];
const STATUSES: [&str; 4] = ["planned", "active", "on-hold", "completed"];
const TAGS: [&str; 5] = ["support", "implementation", "custom", "reports", "software"];

const MAX_PROJECTS_PER_CONSULTANT: usize = 5;
const MAX_STATUSES_PER_PROJECT: usize = 3;
const MAX_ENTRY_CONSULTANTS: usize = 5;
const ENTRIES_PER_TYPE: usize = 5;

/// Insert the demo dataset unless a project already exists. Returns the
/// number of projects created.
pub async fn seed(pool: &PgPool) -> Result<usize, sqlx::Error> {
    let mut rng = StdRng::from_rng(&mut rand::rng());
    seed_with(pool, &mut rng).await
}

pub async fn seed_with(pool: &PgPool, rng: &mut StdRng) -> Result<usize, sqlx::Error> {
    if db::projects::count_all(pool).await? > 0 {
        tracing::debug!("Projects present, skipping demo data");
        return Ok(0);
    }

    let mut tx = pool.begin().await?;

    let mut consultants = Vec::with_capacity(ROSTER.len());
    for (first, last) in ROSTER {
        let email = format!("{}.{}@example.com", first.to_lowercase(), last.to_lowercase());
        let consultant = db::consultants::create(
            &mut *tx,
            &NewConsultant {
                first_name: first.to_string(),
                last_name: last.to_string(),
                profile_picture: format!("https://api.dicebear.com/7.x/lorelei/svg?seed={email}"),
                email,
            },
        )
        .await?;
        db::roles::create(&mut *tx, consultant.id, pick(rng, &ROLES)).await?;
        consultants.push(consultant);
    }

    let mut created = 0;
    for manager in &consultants {
        let count = rng.random_range(1..=MAX_PROJECTS_PER_CONSULTANT);
        for index in 1..=count {
            let project = db::projects::create(&mut *tx, &demo_project(rng, manager, index)).await?;

            insert_statuses(&mut tx, rng, manager, &project).await?;

            let assigned = rng.random_range(1..consultants.len());
            for _ in 0..assigned {
                let Some(consultant) = consultants.choose(rng) else {
                    break;
                };
                db::consultants::assign_to_project(
                    &mut *tx,
                    project.id,
                    consultant.id,
                    pick(rng, &ROLES),
                )
                .await?;
            }

            for _ in 0..rng.random_range(1..=TAGS.len()) {
                db::tags::create(&mut *tx, project.id, pick(rng, &TAGS)).await?;
            }

            insert_time_entries(&mut tx, rng, &consultants, &project).await?;
            created += 1;
        }
        tracing::debug!(
            projects = count,
            "Seeded demo projects for {} {}",
            manager.first_name,
            manager.last_name
        );
    }

    tx.commit().await?;
    tracing::info!(consultants = consultants.len(), projects = created, "Demo data seeded");
    Ok(created)
}

fn demo_project(rng: &mut StdRng, manager: &Consultant, index: usize) -> NewProject {
    let now = Utc::now();
    let projected_start = now - TimeDelta::days(rng.random_range(0..60));
    let start = projected_start + TimeDelta::days(rng.random_range(0..7));
    let projected_end = start + TimeDelta::days(rng.random_range(14..90));
    let end = projected_end + TimeDelta::days(rng.random_range(-7..14));

    NewProject {
        manager_id: Some(manager.id),
        number: format!("PRJ-{index:03}-{}", manager.id),
        name: format!("Demo Project {index} (by {})", manager.first_name),
        projected_start_date: Some(projected_start),
        start_date: Some(start),
        projected_end_date: Some(projected_end),
        end_date: Some(end),
        description: format!(
            "Auto-generated demo project {index} for consultant {}",
            manager.first_name
        ),
    }
}

/// Statuses are inserted oldest first so that a higher id is always the
/// more recent status.
async fn insert_statuses(
    tx: &mut sqlx::PgConnection,
    rng: &mut StdRng,
    author: &Consultant,
    project: &Project,
) -> Result<(), sqlx::Error> {
    let count = rng.random_range(1..=MAX_STATUSES_PER_PROJECT);
    let mut age_days: i64 = rng.random_range(0..14) * count as i64;

    for _ in 0..count {
        let title = pick(rng, &STATUSES);
        db::statuses::create(
            &mut *tx,
            &NewProjectStatus {
                project_id: project.id,
                consultant_id: Some(author.id),
                title: title.to_string(),
                description: format!("Project {} is {title}", project.number),
                date_created: Utc::now() - TimeDelta::days(age_days),
            },
        )
        .await?;
        age_days -= rng.random_range(0..=age_days.min(14));
    }
    Ok(())
}

async fn insert_time_entries(
    tx: &mut sqlx::PgConnection,
    rng: &mut StdRng,
    consultants: &[Consultant],
    project: &Project,
) -> Result<(), sqlx::Error> {
    let mut chosen: Vec<&Consultant> = consultants.iter().collect();
    chosen.shuffle(rng);
    chosen.truncate(rng.random_range(1..=MAX_ENTRY_CONSULTANTS.min(consultants.len())));

    let start = project.start_date.unwrap_or_else(Utc::now);
    for consultant in chosen {
        for entry_type in [EntryType::Debit, EntryType::Credit] {
            for n in 1..=ENTRIES_PER_TYPE {
                let hours = f64::from(rng.random_range(1..=4_u8)) + rng.random::<f64>();
                db::time_entries::create(
                    &mut *tx,
                    &NewTimeEntry {
                        project_id: project.id,
                        consultant_id: Some(consultant.id),
                        entry_type,
                        hours,
                        title: format!("{} #{n}", entry_type.as_str()),
                        description: format!("{} work for {}", entry_type.as_str(), project.name),
                        entry_date: start + TimeDelta::days(rng.random_range(0..30)),
                    },
                )
                .await?;
            }
        }
    }
    Ok(())
}

fn pick<'a>(rng: &mut StdRng, options: &[&'a str]) -> &'a str {
    options.choose(rng).copied().unwrap_or_default()
}
