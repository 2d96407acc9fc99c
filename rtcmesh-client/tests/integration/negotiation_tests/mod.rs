mod test_single_candidate_per_connection;
mod test_unknown_payload_is_dropped;
