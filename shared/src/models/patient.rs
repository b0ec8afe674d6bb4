//! Patient-side models: family members and addresses

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum Relation {
    #[serde(rename = "self")]
    #[cfg_attr(feature = "db", sqlx(rename = "self"))]
    Myself,
    Spouse,
    Child,
    Parent,
    #[default]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Person a sample is collected from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct FamilyMember {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub relation: Relation,
    /// `YYYY-MM-DD`
    pub date_of_birth: Option<String>,
    pub gender: Option<Gender>,
    pub blood_group: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyMemberCreate {
    pub name: String,
    #[serde(default)]
    pub relation: Relation,
    pub date_of_birth: Option<String>,
    pub gender: Option<Gender>,
    pub blood_group: Option<String>,
}

/// Sample-collection address
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Address {
    pub id: i64,
    pub user_id: i64,
    pub label: String,
    pub address: String,
    pub city: Option<String>,
    pub area: Option<String>,
    pub zip_code: Option<String>,
    pub is_default: bool,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressCreate {
    pub label: Option<String>,
    pub address: String,
    pub city: Option<String>,
    pub area: Option<String>,
    pub zip_code: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_self_wire_name() {
        assert_eq!(serde_json::to_string(&Relation::Myself).unwrap(), "\"self\"");
        let r: Relation = serde_json::from_str("\"spouse\"").unwrap();
        assert_eq!(r, Relation::Spouse);
    }
}
