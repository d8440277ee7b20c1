// Field whitelists for every entity that accepts sparse updates

use super::patch::{EntitySchema, FieldSpec, FieldType};
use crate::types::{Role, TournamentStatus, TournamentType};

/// `auth` action `updateProfile`: what a user may change about themselves
pub static USER_PROFILE: EntitySchema = EntitySchema {
    entity: "user",
    fields: &[
        FieldSpec::new("fullName", "full_name", FieldType::Text).not_null(),
        FieldSpec::new("email", "email", FieldType::Email).not_null(),
        FieldSpec::new("birthDate", "birth_date", FieldType::Date),
        FieldSpec::new("fsrId", "fsr_id", FieldType::Text),
        FieldSpec::new("coach", "coach", FieldType::Text),
        FieldSpec::new("educationalInstitution", "educational_institution", FieldType::Text),
        FieldSpec::new("gender", "gender", FieldType::Text),
        FieldSpec::new("representativeEmail", "representative_email", FieldType::Text),
        FieldSpec::new("representativePhone", "representative_phone", FieldType::Text),
    ],
};

/// `auth` action `updateUserById`: the profile fields plus role and activation
pub static USER_ACCOUNT: EntitySchema = EntitySchema {
    entity: "user",
    fields: &[
        FieldSpec::new("fullName", "full_name", FieldType::Text).not_null(),
        FieldSpec::new("email", "email", FieldType::Email).not_null(),
        FieldSpec::new("role", "role", FieldType::OneOf(Role::VALUES)).not_null(),
        FieldSpec::new("isActive", "is_active", FieldType::Boolean).not_null(),
        FieldSpec::new("birthDate", "birth_date", FieldType::Date),
        FieldSpec::new("fsrId", "fsr_id", FieldType::Text),
        FieldSpec::new("coach", "coach", FieldType::Text),
        FieldSpec::new("educationalInstitution", "educational_institution", FieldType::Text),
        FieldSpec::new("gender", "gender", FieldType::Text),
        FieldSpec::new("representativeEmail", "representative_email", FieldType::Text),
        FieldSpec::new("representativePhone", "representative_phone", FieldType::Text),
    ],
};

/// `admin-users` PUT, keyed by column name
pub static ADMIN_USER: EntitySchema = EntitySchema {
    entity: "user",
    fields: &[
        FieldSpec::new("id", "id", FieldType::Integer).read_only(),
        FieldSpec::new("username", "username", FieldType::Text).read_only(),
        FieldSpec::new("full_name", "full_name", FieldType::Text).not_null(),
        FieldSpec::new("email", "email", FieldType::Email).not_null(),
        FieldSpec::new("role", "role", FieldType::OneOf(Role::VALUES)).not_null(),
        FieldSpec::new("is_active", "is_active", FieldType::Boolean).not_null(),
        FieldSpec::new("birth_date", "birth_date", FieldType::Date),
        FieldSpec::new("gender", "gender", FieldType::Text),
        FieldSpec::new("fsr_id", "fsr_id", FieldType::Text),
        FieldSpec::new("coach", "coach", FieldType::Text),
        FieldSpec::new("educational_institution", "educational_institution", FieldType::Text),
        FieldSpec::new("representative_email", "representative_email", FieldType::Text),
        FieldSpec::new("representative_phone", "representative_phone", FieldType::Text),
    ],
};

/// `admin-tournaments` POST and PUT
pub static TOURNAMENT: EntitySchema = EntitySchema {
    entity: "tournament",
    fields: &[
        FieldSpec::new("id", "id", FieldType::Integer).read_only(),
        FieldSpec::new("name", "name", FieldType::Text).not_null(),
        FieldSpec::new("description", "description", FieldType::Text),
        FieldSpec::new("start_date", "start_date", FieldType::Date).not_null(),
        FieldSpec::new("end_date", "end_date", FieldType::Date),
        FieldSpec::new("location", "location", FieldType::Text),
        FieldSpec::new("max_participants", "max_participants", FieldType::Integer),
        FieldSpec::new("registration_deadline", "registration_deadline", FieldType::Date),
        FieldSpec::new("entry_fee", "entry_fee", FieldType::Money),
        FieldSpec::new("prize_fund", "prize_fund", FieldType::Money),
        FieldSpec::new("tournament_type", "tournament_type", FieldType::OneOf(TournamentType::VALUES)).not_null(),
        FieldSpec::new("time_control", "time_control", FieldType::Text),
        FieldSpec::new("rounds", "rounds", FieldType::Integer),
        FieldSpec::new("status", "status", FieldType::OneOf(TournamentStatus::VALUES)).not_null(),
        FieldSpec::new("created_by", "created_by", FieldType::Integer).read_only(),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::patch::{Patch, PatchValue};
    use serde_json::json;

    #[test]
    fn admin_user_patch_never_touches_credentials() {
        let patch = Patch::from_input(
            &ADMIN_USER,
            &json!({"id": 5, "username": "root", "password_hash": "x", "is_active": false}),
        )
        .unwrap();
        assert_eq!(patch.len(), 1);
        assert_eq!(patch.get("is_active"), Some(&PatchValue::Boolean(false)));
    }

    #[test]
    fn profile_schema_maps_camel_case_inputs() {
        let patch = Patch::from_input(&USER_PROFILE, &json!({"fullName": "Anna K", "role": "admin"})).unwrap();
        assert_eq!(patch.assignments()[0].column, "full_name");
        assert!(patch.get("role").is_none());
    }

    #[test]
    fn tournament_enumerations_are_checked() {
        assert!(Patch::from_input(&TOURNAMENT, &json!({"status": "active"})).is_ok());
        assert!(Patch::from_input(&TOURNAMENT, &json!({"status": "postponed"})).is_err());
        assert!(Patch::from_input(&TOURNAMENT, &json!({"tournament_type": "round_robin"})).is_ok());
    }
}
