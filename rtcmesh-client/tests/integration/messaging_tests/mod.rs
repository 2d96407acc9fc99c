mod test_send_message_reaches_every_channel;
