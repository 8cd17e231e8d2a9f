use flashcards_repo::Repos;
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub mod generator;
pub mod test_user;

const TEST_CONFIG: &str = "config_test.toml";

#[derive(Deserialize)]
struct TestConfig {
    database_url: String,
}

#[derive(Debug)]
pub enum RepoType {
    SQLx,
    Mem,
}

/// Builds the repos under test. Postgres repos are only built when a `config_test.toml` with a
/// `database_url` is present; otherwise `None` is returned and the case is skipped.
pub async fn build_repos(repo_type: RepoType) -> Option<Repos> {
    match repo_type {
        RepoType::Mem => Some(flashcards_repo::mem_repo::create_repos()),
        RepoType::SQLx => {
            if !Path::new(TEST_CONFIG).exists() {
                eprintln!("{} not found, skipping Postgres case", TEST_CONFIG);
                return None;
            }
            let config = fs::read_to_string(TEST_CONFIG).unwrap();
            let config: TestConfig = toml::from_str(config.as_str()).unwrap();
            let repos = flashcards_repo::sqlx_repo::create_repos(config.database_url, 1)
                .await
                .unwrap();
            Some(repos)
        }
    }
}
