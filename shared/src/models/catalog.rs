//! Catalog Models: test categories, tests, packages and lab price lists

use serde::{Deserialize, Serialize};

/// Test category entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct TestCategory {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCategoryCreate {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

/// Diagnostic test entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Test {
    pub id: i64,
    pub name: String,
    /// Unique catalog code, e.g. `CBC001`
    pub code: String,
    pub category_id: i64,
    pub description: Option<String>,
    pub turnaround_time: Option<String>,
    pub fasting_required: bool,
    pub sample_type: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCreate {
    pub name: String,
    pub code: String,
    pub category_id: i64,
    pub description: Option<String>,
    pub turnaround_time: Option<String>,
    #[serde(default)]
    pub fasting_required: bool,
    pub sample_type: Option<String>,
}

/// Test with its category name (admin list)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct TestWithCategory {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub category_id: i64,
    pub category_name: String,
    pub description: Option<String>,
    pub turnaround_time: Option<String>,
    pub fasting_required: bool,
    pub sample_type: Option<String>,
    pub created_at: i64,
}

/// Public catalog entry: best available lab price, 0 when no lab offers it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PublicTest {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub category_id: i64,
    pub category_name: String,
    pub description: Option<String>,
    pub turnaround_time: Option<String>,
    pub fasting_required: bool,
    pub sample_type: Option<String>,
    pub best_price: f64,
    pub lab_count: i64,
}

/// Package entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Package {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: f64,
    pub discount_price: Option<f64>,
    pub is_popular: bool,
    pub recommended_for: Option<String>,
    pub created_at: i64,

    // -- Relations (populated by application code, skipped by FromRow) --
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub tests: Vec<PackageTestRef>,
}

impl Package {
    /// Price charged when the package is booked
    pub fn effective_price(&self) -> f64 {
        self.discount_price.unwrap_or(self.price)
    }
}

/// Test included in a package
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PackageTestRef {
    pub id: i64,
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageCreate {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: f64,
    pub discount_price: Option<f64>,
    #[serde(default)]
    pub is_popular: bool,
    pub recommended_for: Option<String>,
    pub test_ids: Vec<i64>,
}

/// A lab's offering of a test (price list row)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct LabTest {
    pub id: i64,
    pub lab_id: i64,
    pub test_id: i64,
    pub test_name: String,
    pub test_code: String,
    pub price: f64,
    pub is_available: bool,
    pub updated_at: i64,
}

/// Add or reprice an offering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabTestUpsert {
    pub test_id: i64,
    pub price: f64,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

/// Update an existing offering by id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabTestUpdate {
    pub price: f64,
    pub is_available: bool,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(price: f64, discount_price: Option<f64>) -> Package {
        Package {
            id: 1,
            name: "Basic Wellness Check".into(),
            slug: "basic-wellness".into(),
            description: None,
            price,
            discount_price,
            is_popular: true,
            recommended_for: None,
            created_at: 0,
            tests: vec![],
        }
    }

    #[test]
    fn test_effective_price_prefers_discount() {
        assert_eq!(package(2500.0, Some(2000.0)).effective_price(), 2000.0);
        assert_eq!(package(2500.0, None).effective_price(), 2500.0);
    }

    #[test]
    fn test_upsert_defaults_available() {
        let body: LabTestUpsert = serde_json::from_str(r#"{"test_id":1,"price":500}"#).unwrap();
        assert!(body.is_available);
    }
}
