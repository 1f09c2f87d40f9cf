mod test_room_recreated_after_empty;
mod test_third_member_rejected;
