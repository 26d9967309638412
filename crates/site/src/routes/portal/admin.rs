//! Admin section route handlers.
//!
//! Member management lives here: listing the roster and changing roles.
//! A role change takes effect at the target's next login; their current
//! session keeps the role snapshot from when they logged in.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use cascade_officials_core::{MemberId, Role};

use crate::db::MemberRepository;
use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::models::{CurrentMember, Member};
use crate::state::AppState;

/// Admin section template.
#[derive(Template, WebTemplate)]
#[template(path = "portal/admin/index.html")]
pub struct AdminTemplate {
    pub member: CurrentMember,
}

/// Member management template.
#[derive(Template, WebTemplate)]
#[template(path = "portal/admin/members.html")]
pub struct AdminMembersTemplate {
    pub member: CurrentMember,
    pub members: Vec<Member>,
    pub roles: Vec<Role>,
    pub error: Option<String>,
}

/// Role change form data. The role arrives as text and must parse into a
/// known role; anything else is rejected.
#[derive(Debug, Deserialize)]
pub struct SetRoleForm {
    pub member_id: i32,
    pub role: String,
}

/// Query parameters for error display on the members page.
#[derive(Debug, Deserialize)]
pub struct MembersQuery {
    pub error: Option<String>,
}

/// Display the admin section.
#[instrument(skip(member))]
pub async fn index(RequireAdmin(member): RequireAdmin) -> impl IntoResponse {
    AdminTemplate { member }
}

/// Display the member roster with role management controls.
#[instrument(skip(state, member))]
pub async fn members(
    State(state): State<AppState>,
    RequireAdmin(member): RequireAdmin,
    axum::extract::Query(query): axum::extract::Query<MembersQuery>,
) -> Result<impl IntoResponse, AppError> {
    let members = MemberRepository::new(state.pool()).list().await?;

    Ok(AdminMembersTemplate {
        member,
        members,
        roles: Role::ALL.to_vec(),
        error: query.error,
    })
}

/// Change a member's role.
#[instrument(skip(state, admin, form), fields(member_id = form.member_id, role = %form.role))]
pub async fn set_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Form(form): Form<SetRoleForm>,
) -> Result<Response, AppError> {
    let Ok(role) = form.role.parse::<Role>() else {
        tracing::warn!(role = %form.role, "Rejected unknown role");
        return Ok(Redirect::to("/portal/admin/members?error=unknown_role").into_response());
    };

    let target = MemberId::new(form.member_id);
    let updated = MemberRepository::new(state.pool())
        .set_role(target, role)
        .await?;

    match updated {
        Some(member) => {
            tracing::info!(
                admin_id = %admin.id,
                member_id = %member.id,
                role = %member.role,
                "Member role changed"
            );
            Ok(Redirect::to("/portal/admin/members").into_response())
        }
        None => Ok(Redirect::to("/portal/admin/members?error=not_found").into_response()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use cascade_officials_core::Email;

    use super::*;

    fn roster_member(role: Role) -> Member {
        Member {
            id: MemberId::new(7),
            email: Email::parse("casey@example.com").unwrap(),
            role,
            display_name: Some("Casey".to_string()),
            certification_level: None,
            created_at: Utc::now(),
            last_login_at: None,
        }
    }

    #[test]
    fn role_select_marks_the_members_current_role() {
        let executive = roster_member(Role::Executive);
        let admin = CurrentMember::from(&roster_member(Role::Admin));

        let page = AdminMembersTemplate {
            member: admin,
            members: vec![executive],
            roles: Role::ALL.to_vec(),
            error: None,
        }
        .render()
        .unwrap();

        assert!(page.contains(r#"<option value="executive" selected>executive</option>"#));
        assert!(!page.contains(r#"value="official" selected"#));
        assert!(!page.contains(r#"value="admin" selected"#));
    }
}
