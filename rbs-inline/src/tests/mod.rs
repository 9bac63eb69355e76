mod test_annotations;
