pub mod queue_statuses;
