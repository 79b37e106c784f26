//! MongoDB implementation of UserRepository
//!
//! Users live in the `users` collection with the UUID string as `_id`.
//! A unique index on `email` backs the service-level duplicate check.
//! Collections keyed by ObjectId are not readable and must be migrated to
//! string UUID ids first.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::{FindOptions, IndexOptions, ReturnDocument};
use mongodb::{Collection, Database, IndexModel};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::error::UserError;
use crate::user::models::{NewUser, User, UserFilter};
use crate::user::repository::UserRepository;

const USERS_COLLECTION: &str = "users";

/// Stored document shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct UserDocument {
    #[serde(rename = "_id")]
    id: Bson,
    name: String,
    age: i64,
    email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    address: Option<String>,
}

impl UserDocument {
    fn new(id: &Uuid, user: &NewUser) -> Self {
        Self {
            id: Bson::String(id.to_string()),
            name: user.name.clone(),
            age: user.age,
            email: user.email.clone(),
            address: user.address.clone(),
        }
    }
}

impl TryFrom<UserDocument> for User {
    type Error = UserError;

    fn try_from(document: UserDocument) -> Result<Self, Self::Error> {
        let id = match &document.id {
            Bson::String(raw) => Uuid::parse_str(raw).map_err(|e| {
                UserError::Database(format!("Stored user id '{raw}' is not a UUID: {e}"))
            })?,
            Bson::ObjectId(oid) => {
                return Err(UserError::Database(format!(
                    "Stored user id ObjectId('{oid}') is not a UUID; migrate the collection \
                     to string UUID ids"
                )));
            },
            other => {
                return Err(UserError::Database(format!("Stored user id {other} is not a UUID")));
            },
        };

        Ok(User {
            id,
            name: document.name,
            age: document.age,
            email: document.email,
            address: document.address,
        })
    }
}

/// MongoDB implementation of the UserRepository
pub struct MongoUserRepository {
    database: Database,
    collection: Collection<UserDocument>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            database: db.clone(),
            collection: db.collection::<UserDocument>(USERS_COLLECTION),
        }
    }

    /// Create the unique e-mail index
    pub async fn ensure_indexes(&self) -> Result<(), UserError> {
        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        self.collection.create_index(index).await?;
        Ok(())
    }

    /// Build a MongoDB filter document from UserFilter
    ///
    /// The search text is regex-escaped so it always matches literally.
    fn build_filter(filter: &UserFilter) -> Document {
        let Some(search) = filter.search() else {
            return doc! {};
        };
        let pattern = regex::escape(search);

        doc! {
            "$or": [
                { "name": { "$regex": pattern.as_str(), "$options": "i" } },
                { "email": { "$regex": pattern.as_str(), "$options": "i" } },
                { "address": { "$regex": pattern.as_str(), "$options": "i" } }
            ]
        }
    }

    fn id_filter(id: &Uuid) -> Document {
        doc! { "_id": id.to_string() }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    fn backend(&self) -> &'static str {
        "mongodb"
    }

    async fn list(
        &self,
        filter: &UserFilter,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<User>, UserError> {
        let options = FindOptions::builder()
            .skip(skip)
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .sort(doc! { "_id": 1 })
            .build();

        let cursor = self.collection.find(Self::build_filter(filter)).with_options(options).await?;
        let documents: Vec<UserDocument> = cursor.try_collect().await?;

        documents.into_iter().map(User::try_from).collect()
    }

    async fn count(&self, filter: &UserFilter) -> Result<u64, UserError> {
        Ok(self.collection.count_documents(Self::build_filter(filter)).await?)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>, UserError> {
        let document = self.collection.find_one(Self::id_filter(id)).await?;
        document.map(User::try_from).transpose()
    }

    async fn find_by_email(
        &self,
        email: &str,
        exclude: Option<&Uuid>,
    ) -> Result<Option<User>, UserError> {
        let mut filter = doc! { "email": email };
        if let Some(id) = exclude {
            filter.insert("_id", doc! { "$ne": id.to_string() });
        }

        let document = self.collection.find_one(filter).await?;
        document.map(User::try_from).transpose()
    }

    async fn insert(&self, user: &NewUser) -> Result<User, UserError> {
        let id = Uuid::now_v7();
        self.collection.insert_one(UserDocument::new(&id, user)).await?;
        Ok(user.clone().into_user(id))
    }

    async fn replace(&self, id: &Uuid, user: &NewUser) -> Result<Option<User>, UserError> {
        let document = self
            .collection
            .find_one_and_replace(Self::id_filter(id), UserDocument::new(id, user))
            .return_document(ReturnDocument::After)
            .await?;

        document.map(User::try_from).transpose()
    }

    async fn delete(&self, id: &Uuid) -> Result<Option<User>, UserError> {
        let document = self.collection.find_one_and_delete(Self::id_filter(id)).await?;
        document.map(User::try_from).transpose()
    }

    async fn ping(&self) -> Result<(), UserError> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_empty() {
        let doc = MongoUserRepository::build_filter(&UserFilter::all());
        assert!(doc.is_empty());
    }

    #[test]
    fn test_build_filter_with_search() {
        let doc = MongoUserRepository::build_filter(&UserFilter::from_search("an"));
        let expected = doc! {
            "$or": [
                { "name": { "$regex": "an", "$options": "i" } },
                { "email": { "$regex": "an", "$options": "i" } },
                { "address": { "$regex": "an", "$options": "i" } }
            ]
        };
        assert_eq!(doc, expected);
    }

    #[test]
    fn test_build_filter_escapes_regex() {
        let doc = MongoUserRepository::build_filter(&UserFilter::from_search("a.b*"));
        let clauses = doc.get_array("$or").unwrap();
        let name = clauses[0].as_document().unwrap().get_document("name").unwrap();
        assert_eq!(name.get_str("$regex").unwrap(), r"a\.b\*");
    }

    #[test]
    fn test_document_round_trip_into_user() {
        let id = Uuid::now_v7();
        let new_user = NewUser {
            name: "An".to_string(),
            age: 20,
            email: "an@x.com".to_string(),
            address: None,
        };

        let user = User::try_from(UserDocument::new(&id, &new_user)).unwrap();
        assert_eq!(user, new_user.into_user(id));
    }

    #[test]
    fn test_corrupt_id_is_a_database_error() {
        let document = UserDocument {
            id: Bson::String("not-a-uuid".to_string()),
            name: "An".to_string(),
            age: 20,
            email: "an@x.com".to_string(),
            address: None,
        };
        assert!(matches!(User::try_from(document), Err(UserError::Database(_))));
    }

    #[test]
    fn test_object_id_document_reports_migration() {
        let document = UserDocument {
            id: Bson::ObjectId(mongodb::bson::oid::ObjectId::new()),
            name: "An".to_string(),
            age: 20,
            email: "an@x.com".to_string(),
            address: None,
        };

        match User::try_from(document) {
            Err(UserError::Database(message)) => {
                assert!(message.contains("ObjectId"));
                assert!(message.contains("migrate"));
            },
            other => panic!("Expected a database error, got {other:?}"),
        }
    }

    /// Requires a disposable MongoDB in `TEST_MONGO_URL`
    #[tokio::test]
    #[ignore]
    async fn test_mongo_round_trip() {
        let url = std::env::var("TEST_MONGO_URL").expect("TEST_MONGO_URL must be set");
        let db = crate::mongo::connect(&url, "user_directory_test", 4).await.unwrap();
        let repo = MongoUserRepository::new(&db);
        repo.ensure_indexes().await.unwrap();

        let email = format!("{}@example.com", Uuid::new_v4());
        let new_user = NewUser {
            name: "Round Trip".to_string(),
            age: 33,
            email: email.clone(),
            address: None,
        };

        let created = repo.insert(&new_user).await.unwrap();
        assert!(matches!(repo.insert(&new_user).await, Err(UserError::EmailExists)));
        assert_eq!(repo.find_by_id(&created.id).await.unwrap(), Some(created.clone()));
        assert!(repo.find_by_email(&email, Some(&created.id)).await.unwrap().is_none());

        assert!(repo.delete(&created.id).await.unwrap().is_some());
        assert!(repo.find_by_id(&created.id).await.unwrap().is_none());
    }
}
