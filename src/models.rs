//! models.rs: record shapes exchanged with the persistence layer.
//!
//! Analytics only ever reads these; ids are opaque strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sentiment::SentimentLabel;

/// One of the four rated feedback dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aspect {
    Service,
    Food,
    Ambiance,
    Value,
}

impl Aspect {
    /// Fixed reporting order.
    pub const ALL: [Aspect; 4] = [Aspect::Service, Aspect::Food, Aspect::Ambiance, Aspect::Value];
}

/// Star ratings; an absent aspect is `None`, never zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ratings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ambiance: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i32>,
}

impl Ratings {
    pub fn uniform(stars: i32) -> Self {
        Self {
            service: Some(stars),
            food: Some(stars),
            ambiance: Some(stars),
            value: Some(stars),
        }
    }

    pub fn get(&self, aspect: Aspect) -> Option<i32> {
        match aspect {
            Aspect::Service => self.service,
            Aspect::Food => self.food,
            Aspect::Ambiance => self.ambiance,
            Aspect::Value => self.value,
        }
    }

    /// `(service + food + ambiance + value) / 4`, only when all four are present.
    pub fn complete_mean(&self) -> Option<f64> {
        let mut sum = 0i64;
        for a in Aspect::ALL {
            sum += i64::from(self.get(a)?);
        }
        Some(sum as f64 / 4.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: String,
    pub table_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratings: Option<Ratings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    /// Write-time tag; informational only, analytics recompute from `comments`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<SentimentLabel>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

impl FeedbackRecord {
    pub fn new(id: impl Into<String>, table_ref: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            table_ref: table_ref.into(),
            ratings: None,
            comments: None,
            created_at,
            customer_name: None,
            customer_phone: None,
            sentiment: None,
            keywords: Vec::new(),
        }
    }

    pub fn with_ratings(mut self, ratings: Ratings) -> Self {
        self.ratings = Some(ratings);
        self
    }

    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = Some(comments.into());
        self
    }

    /// Comment text, treating an empty string as absent.
    pub fn comment(&self) -> Option<&str> {
        self.comments.as_deref().filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestaurantKind {
    #[default]
    Main,
    Branch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    pub owner: String,
    pub num_tables: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_date: Option<DateTime<Utc>>,
    #[serde(default, rename = "type")]
    pub kind: RestaurantKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub id: String,
    pub restaurant: String,
    pub table_number: u32,
    /// URL the table's QR code points at.
    pub feedback_url: String,
    pub created_at: DateTime<Utc>,
}

/// `<frontend>/feedback/<restaurant>/<table number>`
pub fn feedback_url(frontend_url: &str, restaurant_id: &str, table_number: u32) -> String {
    format!(
        "{}/feedback/{}/{}",
        frontend_url.trim_end_matches('/'),
        restaurant_id,
        table_number
    )
}
