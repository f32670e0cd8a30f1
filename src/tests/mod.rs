mod test_report;
