mod test_report {
    use crate::core::derived_metrics::DerivedMetrics;
    use crate::core::electrical_power::{FixedElectricalPower, NoElectricalPower};
    use crate::output::{FileOutput, SinkOutput};
    use crate::snapshot::RawSnapshot;
    use crate::{report, run_snapshot, ReportLine};
    use pretty_assertions::assert_eq;
    use rstest::*;
    use serde_json::{json, Value};
    use std::fs;
    use std::path::PathBuf;

    #[fixture]
    fn single() -> Value {
        json!({
            "time": {"tsHuman": "2023-11-14T22:13:20.000Z"},
            "hp1": {
                "temperatureWaterIn": 30.0,
                "temperatureWaterOut": 35.0,
                "power": 4000,
                "powerInput": 1000,
                "silentModeStatus": false,
            },
            "qc": {"supervisoryControlMode": 2, "flowRateFiltered": 1000},
            "thermostat": {"otFtChEnabled": true, "otFtCoolingEnabled": false},
            "system": {"hostName": "CIC-01234567"},
        })
    }

    fn paths(lines: &[ReportLine]) -> Vec<&str> {
        lines.iter().map(|line| line.path.as_str()).collect()
    }

    fn value_of<'l>(lines: &'l [ReportLine], path: &str) -> Option<&'l Value> {
        lines
            .iter()
            .find(|line| line.path == path)
            .and_then(|line| line.value.as_ref())
    }

    #[rstest]
    fn test_report_for_single_heat_pump(single: Value) {
        let snapshot = RawSnapshot::try_from(single).unwrap();
        let lines = report(&DerivedMetrics::new(&snapshot, &NoElectricalPower));

        assert_eq!(lines.len(), 31);
        assert!(paths(&lines).iter().all(|path| !path.starts_with("hp2.")));
        assert!(paths(&lines).iter().all(|path| !path.starts_with("boiler.")));

        assert_eq!(
            value_of(&lines, "time.tsHuman"),
            Some(&json!("2023-11-14T22:13:20.000Z"))
        );
        assert_eq!(value_of(&lines, "computedHeatPower"), Some(&json!(5768.0)));
        assert_eq!(value_of(&lines, "hp1.computedQuattCop"), Some(&json!(4.0)));
        assert_eq!(value_of(&lines, "hp1.silentModeStatus"), Some(&json!(false)));
        assert_eq!(value_of(&lines, "computedCop"), None);
        assert_eq!(value_of(&lines, "thermostat.otFtRoomSetpoint"), None);
    }

    #[rstest]
    fn test_report_includes_controller_status_rows(single: Value) {
        let snapshot = RawSnapshot::try_from(single).unwrap();
        let lines = report(&DerivedMetrics::new(&snapshot, &NoElectricalPower));

        assert_eq!(value_of(&lines, "system.hostName"), Some(&json!("CIC-01234567")));
        assert_eq!(value_of(&lines, "thermostat.otFtChEnabled"), Some(&json!(true)));
        assert_eq!(value_of(&lines, "thermostat.otFtCoolingEnabled"), Some(&json!(false)));
        for path in ["thermostat.otFtDhwEnabled", "qc.stickyPumpProtectionEnabled"] {
            assert!(paths(&lines).contains(&path), "{path}");
            assert_eq!(value_of(&lines, path), None);
        }
    }

    #[rstest]
    fn test_report_includes_duo_and_open_therm_rows(mut single: Value) {
        single["hp2"] = json!({"temperatureWaterIn": 35.0, "temperatureWaterOut": 38.0});
        single["boiler"] = json!({"otFbChModeActive": false, "otFbFlameOn": false});
        let snapshot = RawSnapshot::try_from(single).unwrap();
        let lines = report(&DerivedMetrics::new(&snapshot, &NoElectricalPower));

        assert_eq!(lines.len(), 50);
        assert_eq!(value_of(&lines, "hp2.computedWaterDelta"), Some(&json!(3.0)));
        assert_eq!(value_of(&lines, "boiler.otFbFlameOn"), Some(&json!(false)));
        assert_eq!(value_of(&lines, "boiler.computedBoilerHeatPower"), Some(&json!(0.0)));
    }

    #[rstest]
    fn test_run_snapshot_writes_csv_report(single: Value) {
        let directory: PathBuf =
            std::env::temp_dir().join(format!("quatt-report-{}", std::process::id()));
        fs::create_dir_all(&directory).unwrap();
        let output = FileOutput::new(directory.clone(), "snapshot__{}.csv".to_string());

        run_snapshot(
            single.to_string().as_bytes(),
            &output,
            &FixedElectricalPower(2000.),
        )
        .unwrap();

        let written = fs::read_to_string(directory.join("snapshot__metrics.csv")).unwrap();
        fs::remove_dir_all(&directory).unwrap();

        let mut rows = written.lines();
        assert_eq!(rows.next(), Some("path,value,unit"));
        assert_eq!(rows.next(), Some("time.tsHuman,2023-11-14T22:13:20.000Z,"));
        assert_eq!(rows.next(), Some("computedHeatPower,5768.0,[W]"));
        assert_eq!(rows.next(), Some("computedCop,2.88,[CoP]"));
        assert!(written.contains("\nthermostat.otFtRoomSetpoint,,[deg C]\n"));
        assert!(written.contains("\nqc.computedSupervisoryControlMode,Heating - heatpump only,\n"));
        assert_eq!(written.lines().count(), 32);
    }

    #[rstest]
    fn test_run_snapshot_rejects_bad_input() {
        assert!(run_snapshot("[1, 2, 3]".as_bytes(), SinkOutput, &NoElectricalPower).is_err());
        assert!(run_snapshot("{\"hp1\":".as_bytes(), SinkOutput, &NoElectricalPower).is_err());
        assert!(run_snapshot("{}".as_bytes(), SinkOutput, &NoElectricalPower).is_ok());
    }
}
