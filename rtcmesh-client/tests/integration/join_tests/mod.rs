mod test_first_peer_joins_empty_room;
mod test_repeated_announcement_keeps_connection;
