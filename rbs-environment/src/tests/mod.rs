mod test_class_entry;
mod test_context;
mod test_environment;
