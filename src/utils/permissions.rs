use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{Person, Post, UpdatePersonRequest, UserRole},
};

pub fn can_mutate_post(post: &Post, user_id: Uuid) -> bool {
    post.author_id == user_id
}

pub fn can_update_person(person: &Person, user_id: Uuid, role: UserRole) -> bool {
    role.is_admin() || person.created_by_id == user_id
}

pub fn can_delete_person(role: UserRole) -> bool {
    role.is_admin()
}

/// Copy of `payload` that non-admins may apply. `is_verified` is dropped
/// silently for anyone but an admin.
pub fn sanitize_person_update(payload: &UpdatePersonRequest, role: UserRole) -> UpdatePersonRequest {
    let mut sanitized = payload.clone();
    if !role.is_admin() {
        sanitized.is_verified = None;
    }
    sanitized
}

pub fn ensure(allowed: bool, message: &str) -> Result<()> {
    if allowed {
        Ok(())
    } else {
        tracing::warn!("Permission denied: {}", message);
        Err(AppError::Authorization(message.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PostType;
    use chrono::Utc;

    fn post_by(author_id: Uuid) -> Post {
        Post {
            id: Uuid::new_v4(),
            post_type: PostType::Warning,
            title: "Watch out".to_string(),
            content: "Details".to_string(),
            person_id: None,
            evidence_urls: Vec::new(),
            is_anonymous: false,
            is_published: true,
            view_count: 0,
            author_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn person_by(created_by_id: Uuid) -> Person {
        Person {
            id: Uuid::new_v4(),
            name: "Jordan".to_string(),
            aliases: vec!["J".to_string()],
            approximate_age: Some(30),
            gender: None,
            phone_number: Some("5551234567".to_string()),
            city: Some("Austin".to_string()),
            state: Some("TX".to_string()),
            country: None,
            profile_image_url: None,
            is_verified: false,
            created_by_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn only_author_mutates_post() {
        let author = Uuid::new_v4();
        let post = post_by(author);

        assert!(can_mutate_post(&post, author));
        assert!(!can_mutate_post(&post, Uuid::new_v4()));
    }

    #[test]
    fn creator_or_admin_updates_person() {
        let creator = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let person = person_by(creator);

        assert!(can_update_person(&person, creator, UserRole::User));
        assert!(can_update_person(&person, stranger, UserRole::Admin));
        assert!(!can_update_person(&person, stranger, UserRole::User));
        assert!(!can_update_person(&person, stranger, UserRole::Moderator));
    }

    #[test]
    fn only_admin_deletes_person() {
        assert!(can_delete_person(UserRole::Admin));
        assert!(!can_delete_person(UserRole::Moderator));
        assert!(!can_delete_person(UserRole::User));
    }

    #[test]
    fn non_admin_cannot_set_verified() {
        let payload = UpdatePersonRequest {
            city: Some("Dallas".to_string()),
            is_verified: Some(true),
            ..Default::default()
        };

        let sanitized = sanitize_person_update(&payload, UserRole::User);

        assert_eq!(sanitized.is_verified, None);
        assert_eq!(sanitized.city.as_deref(), Some("Dallas"));
        // caller's payload is left as sent
        assert_eq!(payload.is_verified, Some(true));
    }

    #[test]
    fn admin_keeps_verified_flag() {
        let payload = UpdatePersonRequest {
            is_verified: Some(true),
            ..Default::default()
        };

        assert_eq!(sanitize_person_update(&payload, UserRole::Admin), payload);
    }

    #[test]
    fn ensure_maps_denial_to_forbidden() {
        assert!(ensure(true, "ok").is_ok());

        let err = ensure(false, "You can only delete your own posts").unwrap_err();
        assert!(matches!(err, AppError::Authorization(ref m) if m == "You can only delete your own posts"));
    }
}
