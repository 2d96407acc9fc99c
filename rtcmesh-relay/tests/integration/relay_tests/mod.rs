mod test_data_routing;
mod test_join_sequence;
mod test_malformed_frame_is_ignored;
