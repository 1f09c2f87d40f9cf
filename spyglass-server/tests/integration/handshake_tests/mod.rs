mod test_response_from_non_target_ignored;
mod test_supersede_pending_request;
