use anyhow::{Context, Result};

use crate::models::{ElementKind, ForecastRecord, OutputFormat};

/// Renders normalized records in the requested output format
pub fn format_records(
    location: &str,
    records: &[ForecastRecord],
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format_forecast(location, records)),
        OutputFormat::Table => Ok(format_table(records)),
        OutputFormat::Csv => format_csv(records),
        OutputFormat::Json => {
            serde_json::to_string_pretty(records).context("Failed to serialize forecast")
        }
    }
}

/// Formats the forecast into a human-readable string
pub fn format_forecast(location: &str, records: &[ForecastRecord]) -> String {
    let mut output = format!("Weather Forecast for {}\n\n", location);
    for record in records {
        output.push_str(&format!(
            "{}:\n  Conditions: {}\n  Temperature: {} / {}\n  Precipitation (12h): {}\n\n",
            record.time_span,
            record.value_or_na(ElementKind::WeatherDescription.label()),
            record.value_or_na(ElementKind::MaxTemperature.label()),
            record.value_or_na(ElementKind::MinTemperature.label()),
            record.value_or_na(ElementKind::PoP12h.label()),
        ));
    }
    output.push_str("Source: Central Weather Administration\n");
    output
}

/// Formats records as a markdown table
pub fn format_table(records: &[ForecastRecord]) -> String {
    let Some(first) = records.first() else {
        return String::new();
    };

    let columns: Vec<&str> = first.fields.iter().map(|f| f.column.as_str()).collect();

    let mut output = format!("| Time | {} |\n", columns.join(" | "));
    output.push_str(&format!("|---|{}\n", "---|".repeat(columns.len())));
    for record in records {
        let cells: Vec<String> = record
            .fields
            .iter()
            .map(|field| field.value.replace('|', "\\|"))
            .collect();
        output.push_str(&format!("| {} | {} |\n", record.time_span, cells.join(" | ")));
    }
    output
}

/// Formats records as CSV with a header row
pub fn format_csv(records: &[ForecastRecord]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    if let Some(first) = records.first() {
        let mut header = vec!["StartTime", "EndTime", "TimeSpan"];
        header.extend(first.fields.iter().map(|f| f.column.as_str()));
        writer.write_record(&header)?;
    }

    for record in records {
        let mut row = vec![
            record.start_time.as_str(),
            record.end_time.as_str(),
            record.time_span.as_str(),
        ];
        row.extend(record.fields.iter().map(|f| f.value.as_str()));
        writer.write_record(&row)?;
    }

    let bytes = writer.into_inner().context("Failed to flush CSV output")?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Field;

    fn record(start: &str, end: &str, span: &str, values: [&str; 4]) -> ForecastRecord {
        ForecastRecord {
            start_time: start.to_string(),
            end_time: end.to_string(),
            time_span: span.to_string(),
            fields: ElementKind::ALL
                .iter()
                .zip(values)
                .map(|(kind, value)| Field {
                    column: kind.label().to_string(),
                    value: value.to_string(),
                })
                .collect(),
        }
    }

    fn sample() -> Vec<ForecastRecord> {
        vec![
            record(
                "2024-01-01T06:00:00",
                "2024-01-01T18:00:00",
                "01/01 06:00 - 18:00",
                ["多雲, 短暫雨", "24\u{00b0}C", "17\u{00b0}C", "30%"],
            ),
            record(
                "2024-01-01T18:00:00",
                "2024-01-02T06:00:00",
                "01/01 18:00 - 06:00",
                ["N/A", "19\u{00b0}C", "15\u{00b0}C", "N/A"],
            ),
        ]
    }

    #[test]
    fn text_lists_every_interval() {
        let output = format_forecast("雲林縣", &sample());
        assert!(output.starts_with("Weather Forecast for 雲林縣\n\n"));
        assert!(output.contains(
            "01/01 06:00 - 18:00:\n  Conditions: 多雲, 短暫雨\n  Temperature: 24\u{00b0}C / 17\u{00b0}C\n  Precipitation (12h): 30%\n"
        ));
        assert!(output.contains("  Precipitation (12h): N/A\n"));
    }

    #[test]
    fn table_has_header_and_rows() {
        let output = format_table(&sample());
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "| Time | WeatherDescription | MaxTemperature | MinTemperature | PoP12h |"
        );
        assert_eq!(lines[1], "|---|---|---|---|---|");
        assert_eq!(
            lines[3],
            "| 01/01 18:00 - 06:00 | N/A | 19\u{00b0}C | 15\u{00b0}C | N/A |"
        );
    }

    #[test]
    fn csv_quotes_fields_with_commas() {
        let output = format_csv(&sample()).unwrap();
        let mut lines = output.lines();
        assert_eq!(
            lines.next(),
            Some("StartTime,EndTime,TimeSpan,WeatherDescription,MaxTemperature,MinTemperature,PoP12h")
        );
        assert_eq!(
            lines.next(),
            Some("2024-01-01T06:00:00,2024-01-01T18:00:00,01/01 06:00 - 18:00,\"多雲, 短暫雨\",24\u{00b0}C,17\u{00b0}C,30%")
        );
    }

    #[test]
    fn json_serializes_fields() {
        let output = format_records("雲林縣", &sample(), OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed[0]["StartTime"], "2024-01-01T06:00:00");
        assert_eq!(parsed[0]["TimeSpan"], "01/01 06:00 - 18:00");
        assert_eq!(parsed[0]["PoP12h"], "30%");
        assert_eq!(parsed[1]["WeatherDescription"], "N/A");
        assert!(parsed[0].get("fields").is_none());
    }
}
