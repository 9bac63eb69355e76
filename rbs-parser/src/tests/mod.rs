mod test_buffer;
mod test_location;
mod test_names;
