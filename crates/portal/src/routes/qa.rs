//! Q&A route handlers.
//!
//! Investors ask questions behind the NDA gate; admins answer. A thread is
//! visible to its asker and, when flagged public, to every investor. The
//! answer endpoint may re-edit an existing answer; the thread stays
//! `answered`.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use ridgeline_core::{QaStatus, QaThread, QaThreadId};

use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireNda};
use crate::state::AppState;

/// Request body for `POST /api/qa/questions`.
#[derive(Debug, Deserialize)]
pub struct SubmitQuestionForm {
    pub question: String,
    pub category: Option<String>,
    #[serde(default)]
    pub is_urgent: bool,
    #[serde(default)]
    pub is_public: bool,
}

/// Request body for `PUT /api/qa/threads/{id}/answer`.
#[derive(Debug, Deserialize)]
pub struct AnswerForm {
    pub answer: String,
}

/// Query parameters for `GET /api/qa/search`.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

/// Ask a question.
///
/// POST /api/qa/questions
#[instrument(skip(state, form), fields(user_id = %user.id))]
pub async fn submit_question(
    State(state): State<AppState>,
    RequireNda(user): RequireNda,
    Json(form): Json<SubmitQuestionForm>,
) -> Result<Json<QaThread>> {
    let question = form.question.trim();
    if question.is_empty() {
        return Err(AppError::Validation("Question is required".to_string()));
    }

    let thread = state.store().insert_thread(QaThread {
        id: QaThreadId::generate(),
        question: question.to_string(),
        category: form.category.filter(|c| !c.trim().is_empty()),
        is_urgent: form.is_urgent,
        is_public: form.is_public,
        asked_by: user.id,
        status: QaStatus::Pending,
        answer: None,
        answered_by: None,
        answered_at: None,
        created_at: Utc::now(),
    })?;

    tracing::info!(thread_id = %thread.id, urgent = thread.is_urgent, "question submitted");
    Ok(Json(thread))
}

/// Threads visible to the caller, newest first.
///
/// GET /api/qa/threads
///
/// Investors see their own threads plus public ones; admins see everything.
pub async fn list_threads(
    State(state): State<AppState>,
    RequireNda(user): RequireNda,
) -> Result<Json<Vec<QaThread>>> {
    let threads = state
        .store()
        .list_threads()?
        .into_iter()
        .filter(|t| user.role.is_admin() || t.visible_to(user.id))
        .collect();
    Ok(Json(threads))
}

/// Answer a thread, or re-edit an existing answer.
///
/// PUT /api/qa/threads/{id}/answer
#[instrument(skip(state, form), fields(admin_id = %admin.id, thread_id = %id))]
pub async fn answer(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<QaThreadId>,
    Json(form): Json<AnswerForm>,
) -> Result<Json<QaThread>> {
    let text = form.answer.trim();
    if text.is_empty() {
        return Err(AppError::Validation("Answer is required".to_string()));
    }

    let mut thread = state.store().thread(id)?;
    thread.answer = Some(text.to_string());
    thread.answered_by = Some(admin.id);
    thread.answered_at = Some(Utc::now());
    thread.status = QaStatus::Answered;

    let thread = state.store().update_thread(thread)?;
    tracing::info!("question answered");
    Ok(Json(thread))
}

/// Case-insensitive search over visible threads (question and answer text).
///
/// GET /api/qa/search?q=
pub async fn search(
    State(state): State<AppState>,
    RequireNda(user): RequireNda,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<QaThread>>> {
    let needle = query.q.trim().to_lowercase();
    let threads = state
        .store()
        .list_threads()?
        .into_iter()
        .filter(|t| user.role.is_admin() || t.visible_to(user.id))
        .filter(|t| {
            needle.is_empty()
                || t.question.to_lowercase().contains(&needle)
                || t.answer
                    .as_deref()
                    .is_some_and(|a| a.to_lowercase().contains(&needle))
                || t.category
                    .as_deref()
                    .is_some_and(|c| c.to_lowercase().contains(&needle))
        })
        .collect();
    Ok(Json(threads))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use ridgeline_core::UserRole;

    use crate::routes::testing::{accept_nda, app, seed_user, send, state};

    #[tokio::test]
    async fn test_questions_sit_behind_the_nda_gate() {
        let state = state();
        let (_, token) = seed_user(&state, "lp@fund.com", UserRole::User);

        let (status, _) = send(
            app(&state),
            "POST",
            "/api/qa/questions",
            Some(&token),
            Some(json!({"question": "What is the runway?"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_ask_and_answer_roundtrip() {
        let state = state();
        let (user, token) = seed_user(&state, "lp@fund.com", UserRole::User);
        accept_nda(&state, &user);
        let (_, admin_token) = seed_user(&state, "admin@fund.com", UserRole::Admin);

        let (status, thread) = send(
            app(&state),
            "POST",
            "/api/qa/questions",
            Some(&token),
            Some(json!({"question": "What is the runway?", "is_urgent": true})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(thread["status"], "pending");

        let path = format!("/api/qa/threads/{}/answer", thread["id"].as_str().unwrap());
        let (status, answered) = send(
            app(&state),
            "PUT",
            &path,
            Some(&admin_token),
            Some(json!({"answer": "Eighteen months at current burn."})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(answered["status"], "answered");

        // Re-editing the answer keeps the thread answered.
        let (status, reedited) = send(
            app(&state),
            "PUT",
            &path,
            Some(&admin_token),
            Some(json!({"answer": "Twenty months after the bridge."})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reedited["answer"], "Twenty months after the bridge.");
        assert_eq!(reedited["status"], "answered");
    }

    #[tokio::test]
    async fn test_visibility_own_public_admin() {
        let state = state();
        let (asker, asker_token) = seed_user(&state, "a@fund.com", UserRole::User);
        accept_nda(&state, &asker);
        let (other, other_token) = seed_user(&state, "b@fund.com", UserRole::User);
        accept_nda(&state, &other);
        let (_, admin_token) = seed_user(&state, "admin@fund.com", UserRole::Admin);

        for (question, public) in [("private question", false), ("public question", true)] {
            send(
                app(&state),
                "POST",
                "/api/qa/questions",
                Some(&asker_token),
                Some(json!({"question": question, "is_public": public})),
            )
            .await;
        }

        let (_, body) = send(app(&state), "GET", "/api/qa/threads", Some(&asker_token), None).await;
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (_, body) = send(app(&state), "GET", "/api/qa/threads", Some(&other_token), None).await;
        let visible = body.as_array().unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0]["question"], "public question");

        let (_, body) = send(app(&state), "GET", "/api/qa/threads", Some(&admin_token), None).await;
        assert_eq!(body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_search_scans_question_and_answer() {
        let state = state();
        let (user, token) = seed_user(&state, "lp@fund.com", UserRole::User);
        accept_nda(&state, &user);
        let (_, admin_token) = seed_user(&state, "admin@fund.com", UserRole::Admin);

        let (_, thread) = send(
            app(&state),
            "POST",
            "/api/qa/questions",
            Some(&token),
            Some(json!({"question": "What is the runway?"})),
        )
        .await;
        let path = format!("/api/qa/threads/{}/answer", thread["id"].as_str().unwrap());
        send(
            app(&state),
            "PUT",
            &path,
            Some(&admin_token),
            Some(json!({"answer": "Eighteen months."})),
        )
        .await;

        let (_, body) = send(app(&state), "GET", "/api/qa/search?q=runway", Some(&token), None).await;
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (_, body) = send(app(&state), "GET", "/api/qa/search?q=months", Some(&token), None).await;
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (_, body) = send(app(&state), "GET", "/api/qa/search?q=dilution", Some(&token), None).await;
        assert_eq!(body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_blank_question_is_422() {
        let state = state();
        let (user, token) = seed_user(&state, "lp@fund.com", UserRole::User);
        accept_nda(&state, &user);

        let (status, body) = send(
            app(&state),
            "POST",
            "/api/qa/questions",
            Some(&token),
            Some(json!({"question": "  "})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["detail"], "Question is required");
    }
}
