use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub year: i32,
    pub detail: Option<String>,
}

/// Body of `POST /books` and `PUT /books/:id`.
#[derive(Debug, Clone, Deserialize)]
pub struct BookInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub detail: Option<String>,
}

impl BookInput {
    pub fn is_complete(&self) -> bool {
        !self.title.trim().is_empty() && !self.author.trim().is_empty() && self.year != 0
    }

    pub fn into_book(self, id: i32) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            year: self.year,
            detail: self.detail,
        }
    }
}

#[derive(Debug, Default)]
pub struct BookFilter {
    pub q: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}
