// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

diesel::table! {
    audit_events (event_id) {
        event_id -> BigInt,
        actor_id -> Text,
        actor_type -> Text,
        actor_user_id -> Nullable<BigInt>,
        actor_json -> Text,
        cause_json -> Text,
        action_json -> Text,
        before_snapshot_json -> Text,
        after_snapshot_json -> Text,
        created_at -> Text,
    }
}

diesel::table! {
    notifications (notification_id) {
        notification_id -> BigInt,
        user_id -> BigInt,
        message -> Text,
        kind -> Text,
        is_read -> Integer,
        created_at -> Text,
    }
}

diesel::table! {
    sessions (session_id) {
        session_id -> BigInt,
        session_token -> Text,
        user_id -> BigInt,
        created_at -> Text,
        last_activity_at -> Text,
        expires_at -> Text,
    }
}

diesel::table! {
    territories (territory_id) {
        territory_id -> BigInt,
        name -> Text,
        status -> Text,
        map_url -> Text,
        map_file -> Nullable<Text>,
        permanent_notes -> Text,
        created_at -> Text,
        assigned_to -> Nullable<BigInt>,
        assigned_to_name -> Nullable<Text>,
        assignment_date -> Nullable<Text>,
        due_date -> Nullable<Text>,
    }
}

diesel::table! {
    territory_history (history_id) {
        history_id -> BigInt,
        territory_id -> BigInt,
        user_id -> BigInt,
        user_name -> Text,
        assignment_date -> Nullable<Text>,
        completed_date -> Text,
        notes -> Nullable<Text>,
    }
}

diesel::table! {
    territory_requests (request_id) {
        request_id -> BigInt,
        user_id -> BigInt,
        user_name -> Text,
        request_date -> Text,
        status -> Text,
    }
}

diesel::table! {
    users (user_id) {
        user_id -> BigInt,
        email -> Text,
        display_name -> Text,
        password_hash -> Text,
        role -> Text,
        created_at -> Text,
        last_login_at -> Nullable<Text>,
    }
}

diesel::joinable!(notifications -> users (user_id));
diesel::joinable!(sessions -> users (user_id));
diesel::joinable!(territory_history -> territories (territory_id));
diesel::joinable!(territory_requests -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    audit_events,
    notifications,
    sessions,
    territories,
    territory_history,
    territory_requests,
    users,
);
