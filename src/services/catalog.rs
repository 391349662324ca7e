//! Catalog management service: authors, categories and books.
//!
//! Every successful mutation is recorded in the audit log under the acting
//! user's email.

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        audit::AuditAction,
        author::{Author, AuthorQuery, CreateAuthor, UpdateAuthor},
        book::{Book, BookQuery, BookSummary, CreateBook, UpdateBook},
        category::{Category, CategoryQuery, CreateCategory, UpdateCategory},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    // =========================================================================
    // Authors
    // =========================================================================

    pub async fn search_authors(&self, query: &AuthorQuery) -> AppResult<(Vec<Author>, i64)> {
        self.repository.authors.search(query).await
    }

    pub async fn get_author(&self, id: i32) -> AppResult<Author> {
        self.repository.authors.get_by_id(id).await
    }

    pub async fn create_author(&self, actor: &str, author: CreateAuthor) -> AppResult<Author> {
        author.validate()?;

        let created = self.repository.authors.create(&author).await?;
        self.repository
            .audits
            .record(actor, AuditAction::Add, &format!("author:{}", created.id))
            .await?;

        Ok(created)
    }

    pub async fn update_author(
        &self,
        actor: &str,
        id: i32,
        author: UpdateAuthor,
    ) -> AppResult<Author> {
        author.validate()?;

        let updated = self.repository.authors.update(id, &author).await?;
        self.repository
            .audits
            .record(actor, AuditAction::Update, &format!("author:{}", id))
            .await?;

        Ok(updated)
    }

    // =========================================================================
    // Categories
    // =========================================================================

    pub async fn search_categories(
        &self,
        query: &CategoryQuery,
    ) -> AppResult<(Vec<Category>, i64)> {
        self.repository.categories.search(query).await
    }

    pub async fn get_category(&self, id: i32) -> AppResult<Category> {
        self.repository.categories.get_by_id(id).await
    }

    pub async fn create_category(
        &self,
        actor: &str,
        category: CreateCategory,
    ) -> AppResult<Category> {
        category.validate()?;

        if self.repository.categories.name_exists(&category.name, None).await? {
            return Err(AppError::AlreadyExists(format!(
                "Category with name '{}' already exists",
                category.name
            )));
        }

        let created = self.repository.categories.create(&category).await?;
        self.repository
            .audits
            .record(actor, AuditAction::Add, &format!("category:{}", created.id))
            .await?;

        Ok(created)
    }

    pub async fn update_category(
        &self,
        actor: &str,
        id: i32,
        category: UpdateCategory,
    ) -> AppResult<Category> {
        category.validate()?;

        if self
            .repository
            .categories
            .name_exists(&category.name, Some(id))
            .await?
        {
            return Err(AppError::AlreadyExists(format!(
                "Category with name '{}' already exists",
                category.name
            )));
        }

        let updated = self.repository.categories.update(id, &category).await?;
        self.repository
            .audits
            .record(actor, AuditAction::Update, &format!("category:{}", id))
            .await?;

        Ok(updated)
    }

    // =========================================================================
    // Books
    // =========================================================================

    pub async fn search_books(&self, query: &BookQuery) -> AppResult<(Vec<BookSummary>, i64)> {
        self.repository.books.search(query).await
    }

    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    pub async fn create_book(&self, actor: &str, book: CreateBook) -> AppResult<Book> {
        book.validate()?;
        self.check_book_references(book.category_id, &book.author_ids).await?;

        let created = self.repository.books.create(&book).await?;
        self.repository
            .audits
            .record(actor, AuditAction::Add, &format!("book:{}", created.id))
            .await?;

        Ok(created)
    }

    pub async fn update_book(&self, actor: &str, id: i32, book: UpdateBook) -> AppResult<Book> {
        book.validate()?;
        self.check_book_references(book.category_id, &book.author_ids).await?;

        let updated = self.repository.books.update(id, &book).await?;
        self.repository
            .audits
            .record(actor, AuditAction::Update, &format!("book:{}", id))
            .await?;

        Ok(updated)
    }

    /// A book may only reference an existing category and existing authors
    async fn check_book_references(&self, category_id: i32, author_ids: &[i32]) -> AppResult<()> {
        if !self.repository.categories.exists(category_id).await? {
            return Err(AppError::NotFound(format!(
                "Category with id {} not found",
                category_id
            )));
        }

        if let Some(missing) = self.repository.authors.missing_ids(author_ids).await? {
            return Err(AppError::NotFound(format!(
                "Author with id {} not found",
                missing
            )));
        }

        Ok(())
    }
}
