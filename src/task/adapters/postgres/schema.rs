//! Diesel schema for task persistence.

diesel::table! {
    /// Task records bound to a project schema.
    tasks (id) {
        /// Internal task identifier.
        id -> Uuid,
        /// Project schema governing the task.
        schema_id -> Uuid,
        /// Owning project.
        project_id -> Uuid,
        /// Task type.
        task_type_id -> Uuid,
        /// Sequential number within the project.
        number -> Int8,
        /// Human-readable key such as `PROJ-12`.
        #[max_length = 64]
        task_key -> Varchar,
        /// One-line summary.
        #[max_length = 1024]
        summary -> Varchar,
        /// Current workflow status.
        status_id -> Uuid,
        /// User who created the task.
        creator_id -> Uuid,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
        /// Count of committed summary and field edits.
        revision -> Int8,
    }
}

diesel::table! {
    /// Custom field values, one row per task and field.
    field_values (task_id, field_id) {
        /// Owning task.
        task_id -> Uuid,
        /// Field definition.
        field_id -> Uuid,
        /// JSON value validated against the field type.
        value -> Jsonb,
    }
}

diesel::table! {
    /// Append-only task audit log.
    task_events (id) {
        /// Event identifier.
        id -> Uuid,
        /// Insertion order, assigned by the database.
        seq -> Int8,
        /// Task the event belongs to.
        task_id -> Uuid,
        /// Event kind.
        #[max_length = 32]
        event_type -> Varchar,
        /// Snapshot of the changed field.
        field -> Nullable<Jsonb>,
        /// Value before the change.
        old_value -> Nullable<Jsonb>,
        /// Value after the change.
        new_value -> Nullable<Jsonb>,
        /// Acting user.
        user_id -> Uuid,
        /// Event timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Directed links between tasks.
    links (id) {
        /// Link identifier.
        id -> Uuid,
        /// Link type.
        link_type_id -> Uuid,
        /// Source task.
        src_task_id -> Uuid,
        /// Destination task.
        dest_task_id -> Uuid,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(field_values -> tasks (task_id));
diesel::joinable!(task_events -> tasks (task_id));

diesel::allow_tables_to_appear_in_same_query!(tasks, field_values, task_events, links);
