//! Form catalog, assignment and submission endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use medform_common::db::models::{Form, Question, User};
use medform_common::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::error::ApiResult;
use crate::api::principal::{CurrentManager, CurrentUser};
use crate::db::assignments::{self, RangeOverride};
use crate::db::forms::{self, QuestionFields};
use crate::db::submissions::{self, AnswerInput, SubmissionGroup};
use crate::pagination::{calculate_pagination, PageQuery, Paged};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct FormSummary {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct QuestionView {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_max: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct FormDetail {
    pub id: i64,
    pub name: String,
    pub user_id: i64,
    pub questions: Vec<QuestionView>,
}

#[derive(Debug, Deserialize)]
pub struct CreateFormRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct FieldRequest {
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    pub question: String,
    pub ref_min: Option<i64>,
    pub ref_max: Option<i64>,
}

fn default_kind() -> String {
    "number".to_string()
}

#[derive(Debug, Deserialize)]
pub struct QuestionRef {
    pub id: i64,
    pub ref_min: Option<i64>,
    pub ref_max: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub user_id: i64,
    #[serde(default)]
    pub question_refs: Vec<QuestionRef>,
}

#[derive(Debug, Deserialize)]
pub struct FormAnswer {
    pub field_id: i64,
    pub answer: String,
}

fn question_view(question: Question) -> QuestionView {
    QuestionView {
        id: question.id,
        kind: question.kind,
        question: question.question,
        ref_min: question.ref_min,
        ref_max: question.ref_max,
    }
}

fn summary(form: Form) -> FormSummary {
    FormSummary {
        id: form.id,
        name: form.name,
    }
}

/// Mutating a form (or anything under it) is reserved to its creator
fn require_creator(form: &Form, user: &User) -> Result<()> {
    if form.user_id != user.id {
        return Err(Error::PermissionDenied(
            "You are not allowed to access this form".to_string(),
        ));
    }
    Ok(())
}

async fn form_detail(state: &AppState, form: Form) -> Result<FormDetail> {
    let questions = forms::list_questions(&state.db, form.id).await?;
    Ok(FormDetail {
        id: form.id,
        name: form.name,
        user_id: form.user_id,
        questions: questions.into_iter().map(question_view).collect(),
    })
}

/// GET /forms/all
pub async fn list_all_forms(
    State(state): State<AppState>,
    CurrentManager(_): CurrentManager,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Paged<FormSummary>>> {
    let total = forms::count_forms(&state.db).await?;
    let pagination = calculate_pagination(total, query.page);
    let rows = forms::list_forms(&state.db, pagination.offset).await?;

    let items = rows.into_iter().map(summary).collect();
    Ok(Json(Paged::new(pagination, total, items)))
}

/// GET /forms/list
///
/// Forms assigned to the caller.
pub async fn list_assigned_forms(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Paged<FormSummary>>> {
    let total = forms::count_forms_assigned_to(&state.db, user.id).await?;
    let pagination = calculate_pagination(total, query.page);
    let rows = forms::list_forms_assigned_to(&state.db, user.id, pagination.offset).await?;

    let items = rows.into_iter().map(summary).collect();
    Ok(Json(Paged::new(pagination, total, items)))
}

/// POST /forms/create
pub async fn create_form(
    State(state): State<AppState>,
    CurrentManager(user): CurrentManager,
    Json(request): Json<CreateFormRequest>,
) -> ApiResult<Json<FormDetail>> {
    let form = forms::create_form(&state.db, &request.name, user.id).await?;
    Ok(Json(form_detail(&state, form).await?))
}

/// GET /forms/:id
pub async fn get_form(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<FormDetail>> {
    let form = forms::require_form(&state.db, id).await?;
    Ok(Json(form_detail(&state, form).await?))
}

/// PUT /forms/:id
pub async fn update_form(
    State(state): State<AppState>,
    CurrentManager(user): CurrentManager,
    Path(id): Path<i64>,
    Json(request): Json<CreateFormRequest>,
) -> ApiResult<Json<FormDetail>> {
    let form = forms::require_form(&state.db, id).await?;
    require_creator(&form, &user)?;

    forms::update_form(&state.db, id, &request.name).await?;
    let form = forms::require_form(&state.db, id).await?;
    Ok(Json(form_detail(&state, form).await?))
}

/// DELETE /forms/:id
pub async fn delete_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let form = forms::require_form(&state.db, id).await?;
    require_creator(&form, &user)?;

    forms::delete_form(&state.db, id).await?;
    Ok(Json(json!({"detail": "deleted"})))
}

/// GET /forms/:id/fields
pub async fn list_fields(
    State(state): State<AppState>,
    CurrentManager(user): CurrentManager,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<QuestionView>>> {
    let form = forms::require_form(&state.db, id).await?;
    require_creator(&form, &user)?;

    let questions = forms::list_questions(&state.db, id).await?;
    Ok(Json(questions.into_iter().map(question_view).collect()))
}

/// POST /forms/:id/fields
///
/// The query layer re-checks role and creatorship.
pub async fn create_field(
    State(state): State<AppState>,
    CurrentManager(user): CurrentManager,
    Path(id): Path<i64>,
    Json(request): Json<FieldRequest>,
) -> ApiResult<Json<QuestionView>> {
    let question = forms::create_question(
        &state.db,
        id,
        user.id,
        QuestionFields {
            kind: request.kind,
            question: request.question,
            ref_min: request.ref_min,
            ref_max: request.ref_max,
        },
    )
    .await?;

    Ok(Json(question_view(question)))
}

/// GET /forms/field/:id
pub async fn get_field(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<QuestionView>> {
    let question = forms::get_question(&state.db, id)
        .await?
        .ok_or_else(|| Error::NotFound("Question not found".to_string()))?;

    Ok(Json(question_view(question)))
}

/// PUT /forms/field/:id
pub async fn update_field(
    State(state): State<AppState>,
    CurrentManager(user): CurrentManager,
    Path(id): Path<i64>,
    Json(request): Json<FieldRequest>,
) -> ApiResult<Json<QuestionView>> {
    let question = forms::get_question(&state.db, id)
        .await?
        .ok_or_else(|| Error::NotFound("Question not found".to_string()))?;
    let form = forms::require_form(&state.db, question.form_id).await?;
    require_creator(&form, &user)?;

    forms::update_question(
        &state.db,
        id,
        QuestionFields {
            kind: request.kind,
            question: request.question,
            ref_min: request.ref_min,
            ref_max: request.ref_max,
        },
    )
    .await?;

    let question = forms::get_question(&state.db, id)
        .await?
        .ok_or_else(|| Error::NotFound("Question not found".to_string()))?;
    Ok(Json(question_view(question)))
}

/// DELETE /forms/field/:id
pub async fn delete_field(
    State(state): State<AppState>,
    CurrentManager(user): CurrentManager,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let question = forms::get_question(&state.db, id)
        .await?
        .ok_or_else(|| Error::NotFound("Question not found".to_string()))?;
    let form = forms::require_form(&state.db, question.form_id).await?;
    require_creator(&form, &user)?;

    forms::delete_question(&state.db, id).await?;
    Ok(Json(json!({"detail": "deleted"})))
}

/// POST /forms/:id/assign
pub async fn assign_form(
    State(state): State<AppState>,
    CurrentManager(user): CurrentManager,
    Path(id): Path<i64>,
    Json(request): Json<AssignRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let form = forms::require_form(&state.db, id).await?;
    require_creator(&form, &user)?;

    let overrides: Vec<RangeOverride> = request
        .question_refs
        .into_iter()
        .map(|entry| RangeOverride {
            question_id: entry.id,
            ref_min: entry.ref_min,
            ref_max: entry.ref_max,
        })
        .collect();

    assignments::assign_form(&state.db, id, request.user_id, &overrides).await?;
    Ok((StatusCode::CREATED, Json(json!({"message": "created"}))))
}

/// POST /forms/:id/submit
///
/// Open to any authenticated user, assigned or not.
pub async fn submit_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(answers): Json<Vec<FormAnswer>>,
) -> ApiResult<Json<Value>> {
    let inputs: Vec<AnswerInput> = answers
        .into_iter()
        .map(|a| AnswerInput {
            field_id: a.field_id,
            answer: a.answer,
        })
        .collect();

    submissions::submit_form(&state.db, id, user.id, &inputs).await?;
    Ok(Json(json!({"message": "created"})))
}

/// GET /forms/:id/answers
///
/// Reconstructed submissions with effective reference ranges.
pub async fn list_submissions(
    State(state): State<AppState>,
    CurrentManager(user): CurrentManager,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<SubmissionGroup>>> {
    let form = forms::require_form(&state.db, id).await?;
    require_creator(&form, &user)?;

    let groups = submissions::list_form_submissions(&state.db, id).await?;
    Ok(Json(groups))
}
