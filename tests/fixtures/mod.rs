//! Fixtures used by the end-to-end and integration tests

use match_predictor::models::job::Category;

/// A fixture to request a prediction for
#[derive(Debug, Clone)]
pub struct TestFixture {
    pub team_a: &'static str,
    pub team_b: &'static str,
    pub category: Category,
    pub description: &'static str,
}

pub const TEST_FIXTURES: &[TestFixture] = &[
    TestFixture {
        team_a: "Arsenal",
        team_b: "Chelsea",
        category: Category::Men,
        description: "London derby, canonical names",
    },
    TestFixture {
        team_a: "man utd",
        team_b: "Spurs",
        category: Category::Men,
        description: "Aliases on both sides",
    },
    TestFixture {
        team_a: "Barcelona",
        team_b: "Chelsea",
        category: Category::Women,
        description: "Women's Champions League fixture",
    },
];

/// Unique team names so repeated runs never hit the 24h reuse window.
pub fn unique_fixture(label: &str) -> (String, String) {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    (
        format!("{label} Home {}", &suffix[..8]),
        format!("{label} Away {}", &suffix[..8]),
    )
}
