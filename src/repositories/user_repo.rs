//! # 사용자 리포지토리 구현
//!
//! 사용자 엔티티의 데이터 액세스 계층을 담당하는 리포지토리입니다.
//! MongoDB를 저장소로 사용하며, `UserStore` trait의 운영 구현체입니다.
//!
//! ## 특징
//!
//! - **유니크 제약**: username, email에 유니크 인덱스
//! - **조건부 회전**: 리프레시 토큰 교체를 원자적 조건부 업데이트로 수행
//! - **집계 조회**: 채널 프로필을 `subscriptions` 컬렉션과의
//!   단일 집계 파이프라인으로 구성

use async_trait::async_trait;
use futures_util::stream::TryStreamExt;
use mongodb::{
    IndexModel,
    bson::{Bson, DateTime, Document, doc, oid::ObjectId},
    options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument},
};

use crate::db::Database;
use crate::domain::dto::response::ChannelProfile;
use crate::domain::entities::user::User;
use crate::errors::errors::{AppError, AppResult};
use crate::repositories::{ProfileUpdate, UserStore};

/// 사용자 컬렉션 이름
const USERS_COLLECTION: &str = "users";
/// 구독 관계 컬렉션 이름 (읽기 전용으로만 접근)
const SUBSCRIPTIONS_COLLECTION: &str = "subscriptions";

/// 사용자 데이터 액세스 리포지토리
pub struct UserRepository {
    db: Database,
}

impl UserRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn collection(&self) -> mongodb::Collection<User> {
        self.db.collection::<User>(USERS_COLLECTION)
    }

    fn parse_object_id(id: &str) -> AppResult<ObjectId> {
        ObjectId::parse_str(id)
            .map_err(|_| AppError::ValidationError("유효하지 않은 ID 형식입니다".to_string()))
    }

    /// 데이터베이스 인덱스 생성
    ///
    /// 애플리케이션 초기화 시점에 한 번 실행하여 유니크 제약과
    /// 조회 성능을 보장합니다.
    pub async fn create_indexes(&self) -> AppResult<()> {
        let username_index = IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("username_unique".to_string())
                    .build(),
            )
            .build();

        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("email_unique".to_string())
                    .build(),
            )
            .build();

        let created_at_index = IndexModel::builder()
            .keys(doc! { "created_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("created_at_desc".to_string())
                    .build(),
            )
            .build();

        self.collection()
            .create_indexes([username_index, email_index, created_at_index])
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let object_id = Self::parse_object_id(id)?;

        self.collection()
            .find_one(doc! { "_id": object_id })
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    async fn find_by_username_or_email(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> AppResult<Option<User>> {
        let mut conditions = Vec::new();
        if let Some(username) = username {
            conditions.push(doc! { "username": username.to_lowercase() });
        }
        if let Some(email) = email {
            conditions.push(doc! { "email": email });
        }

        if conditions.is_empty() {
            return Ok(None);
        }

        self.collection()
            .find_one(doc! { "$or": conditions })
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    async fn create(&self, mut user: User) -> AppResult<User> {
        let result = self
            .collection()
            .insert_one(&user)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        user.id = result.inserted_id.as_object_id();

        Ok(user)
    }

    async fn update_profile(
        &self,
        id: &str,
        update: ProfileUpdate,
    ) -> AppResult<Option<User>> {
        let object_id = Self::parse_object_id(id)?;

        let mut set_doc = doc! { "updated_at": DateTime::now() };
        if let Some(full_name) = update.full_name {
            set_doc.insert("full_name", full_name);
        }
        if let Some(email) = update.email {
            set_doc.insert("email", email);
        }
        if let Some(avatar) = update.avatar {
            set_doc.insert("avatar", avatar);
        }
        if let Some(cover_image) = update.cover_image {
            set_doc.insert("cover_image", cover_image);
        }

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection()
            .find_one_and_update(doc! { "_id": object_id }, doc! { "$set": set_doc })
            .with_options(options)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    async fn set_password_hash(&self, id: &str, password_hash: &str) -> AppResult<()> {
        let object_id = Self::parse_object_id(id)?;

        self.collection()
            .update_one(
                doc! { "_id": object_id },
                doc! { "$set": { "password_hash": password_hash, "updated_at": DateTime::now() } },
            )
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn set_refresh_token(&self, id: &str, token: &str) -> AppResult<()> {
        let object_id = Self::parse_object_id(id)?;

        self.collection()
            .update_one(
                doc! { "_id": object_id },
                doc! { "$set": { "refresh_token": token, "updated_at": DateTime::now() } },
            )
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn rotate_refresh_token(
        &self,
        id: &str,
        expected: &str,
        new_token: &str,
    ) -> AppResult<bool> {
        let object_id = Self::parse_object_id(id)?;

        // 저장된 토큰이 여전히 expected 와 같을 때만 교체한다.
        // 동시 갱신 경쟁에서 한쪽만 성공하도록 하는 조건부 업데이트.
        let result = self
            .collection()
            .update_one(
                doc! { "_id": object_id, "refresh_token": expected },
                doc! { "$set": { "refresh_token": new_token, "updated_at": DateTime::now() } },
            )
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(result.matched_count > 0)
    }

    async fn clear_refresh_token(&self, id: &str) -> AppResult<()> {
        let object_id = Self::parse_object_id(id)?;

        self.collection()
            .update_one(
                doc! { "_id": object_id },
                doc! {
                    "$unset": { "refresh_token": "" },
                    "$set": { "updated_at": DateTime::now() },
                },
            )
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn channel_profile(
        &self,
        username: &str,
        viewer_id: Option<&str>,
    ) -> AppResult<Option<ChannelProfile>> {
        let is_subscribed: Bson = match viewer_id {
            Some(id) => {
                let viewer_oid = Self::parse_object_id(id)?;
                doc! { "$in": [viewer_oid, "$subscribers.subscriber"] }.into()
            }
            None => Bson::Boolean(false),
        };

        let pipeline = vec![
            doc! { "$match": { "username": username.to_lowercase() } },
            doc! { "$lookup": {
                "from": SUBSCRIPTIONS_COLLECTION,
                "localField": "_id",
                "foreignField": "channel",
                "as": "subscribers",
            }},
            doc! { "$lookup": {
                "from": SUBSCRIPTIONS_COLLECTION,
                "localField": "_id",
                "foreignField": "subscriber",
                "as": "subscribed_to",
            }},
            doc! { "$addFields": {
                "subscriberCount": { "$size": "$subscribers" },
                "channelsSubscribedToCount": { "$size": "$subscribed_to" },
                "isSubscribed": is_subscribed,
            }},
            doc! { "$project": {
                "_id": 0,
                "username": 1,
                "fullName": "$full_name",
                "email": 1,
                "avatar": 1,
                "coverImage": "$cover_image",
                "subscriberCount": 1,
                "channelsSubscribedToCount": 1,
                "isSubscribed": 1,
            }},
        ];

        let mut cursor = self
            .db
            .collection::<Document>(USERS_COLLECTION)
            .aggregate(pipeline)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        match cursor
            .try_next()
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?
        {
            Some(document) => {
                let profile = mongodb::bson::from_document::<ChannelProfile>(document)
                    .map_err(|e| AppError::InternalError(format!("집계 결과 역직렬화 실패: {}", e)))?;
                Ok(Some(profile))
            }
            None => Ok(None),
        }
    }
}
