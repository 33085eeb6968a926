//! Output formatting module

use autotoll_types::OutputFormat;
use autotoll_types::Result;
use autotoll_types::{
    AnalyticsReport, RegistryOwner, RegistryVehicle, Summary, TollRecord, VehicleStatusReport,
};
use chrono::{DateTime, Utc};

fn format_timestamp(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn output_record(output_format: OutputFormat, record: &TollRecord) -> Result<()> {
    if output_format == OutputFormat::Json {
        let content = serde_json::to_string_pretty(record)?;
        println!("{}", content);
    } else {
        println!("\nToll Pass");
        println!("=========");
        println!("Record:       {}", record.id);
        println!("Time:         {}", format_timestamp(record.timestamp_ms));
        println!("Vehicle:      {}", record.vehicle_type);
        println!("Plate:        {}", record.license_plate);
        println!("Confidence:   {:.0}%", record.confidence * 100.0);
        println!("Toll:         {:.2}", record.toll_amount);
        println!("Status:       {}", record.status);

        if !record.make_model.is_empty() {
            println!("Make/model:   {}", record.make_model);
        }
        if !record.color.is_empty() {
            println!("Color:        {}", record.color);
        }
        if let Some(ref owner) = record.owner {
            println!("Owner:        {} ({})", owner.name, owner.info);
        }
        if !record.description.is_empty() {
            println!("\n{}", record.description);
        }
    }

    Ok(())
}

pub fn output_records(output_format: OutputFormat, records: &[TollRecord]) -> Result<()> {
    if output_format == OutputFormat::Json {
        let content = serde_json::to_string_pretty(records)?;
        println!("{}", content);
        return Ok(());
    }

    if records.is_empty() {
        println!("No records.");
        return Ok(());
    }

    println!(
        "{:<6} {:<20} {:<12} {:<12} {:>6} {:>8}  {}",
        "ID", "Time", "Vehicle", "Plate", "Conf", "Toll", "Status"
    );
    println!("{}", "-".repeat(78));
    for record in records {
        println!(
            "{:<6} {:<20} {:<12} {:<12} {:>5.0}% {:>8.2}  {}",
            record.id,
            format_timestamp(record.timestamp_ms),
            record.vehicle_type.label(),
            record.license_plate,
            record.confidence * 100.0,
            record.toll_amount,
            record.status,
        );
    }
    println!("\n{} record(s)", records.len());

    Ok(())
}

pub fn output_summary(output_format: OutputFormat, summary: &Summary) -> Result<()> {
    if output_format == OutputFormat::Json {
        let content = serde_json::to_string_pretty(summary)?;
        println!("{}", content);
    } else {
        println!("\nDashboard Summary");
        println!("=================");
        println!("Total vehicles:  {}", summary.total_vehicles);
        println!("Total revenue:   {:.2}", summary.total_revenue);
        println!("Avg confidence:  {:.0}%", summary.avg_confidence * 100.0);
        println!("Pending review:  {}", summary.pending_review);
    }

    Ok(())
}

pub fn output_analytics(output_format: OutputFormat, report: &AnalyticsReport) -> Result<()> {
    if output_format == OutputFormat::Json {
        let content = serde_json::to_string_pretty(report)?;
        println!("{}", content);
        return Ok(());
    }

    output_summary(output_format, &report.summary)?;

    if !report.vehicle_distribution.is_empty() {
        println!("\nVehicle distribution:");
        for slice in &report.vehicle_distribution {
            println!("  {:<12} {}", slice.vehicle_type, slice.count);
        }
    }

    if !report.revenue_trend.is_empty() {
        println!("\nRevenue trend:");
        for point in &report.revenue_trend {
            println!("  {:<12} {:>10.2}", point.date, point.revenue);
        }
    }

    if !report.hourly_traffic.is_empty() {
        println!("\nTraffic by hour:");
        for point in &report.hourly_traffic {
            println!("  {:>2}:00  {}", point.hour, point.count);
        }
    }

    Ok(())
}

pub fn output_status(output_format: OutputFormat, report: &VehicleStatusReport) -> Result<()> {
    if output_format == OutputFormat::Json {
        let content = serde_json::to_string_pretty(report)?;
        println!("{}", content);
        return Ok(());
    }

    if !report.found {
        println!("Plate not registered.");
        return Ok(());
    }

    println!("\nVehicle Status");
    println!("==============");
    if let Some(ref vehicle) = report.vehicle {
        println!("Plate:       {}", vehicle.license_plate);
        println!("Make/model:  {}", vehicle.make_model);
    }
    if let Some(ref owner) = report.owner {
        println!("Owner:       {}", owner.name);
        println!("Contact:     {}", owner.contact_info);
    }
    if let Some(count) = report.history_count {
        println!("Passes:      {}", count);
    }
    if let Some(due) = report.total_due {
        println!("Total due:   {:.2}", due);
    }

    Ok(())
}

pub fn output_vehicles(output_format: OutputFormat, vehicles: &[RegistryVehicle]) -> Result<()> {
    if output_format == OutputFormat::Json {
        let content = serde_json::to_string_pretty(vehicles)?;
        println!("{}", content);
        return Ok(());
    }

    if vehicles.is_empty() {
        println!("No registered vehicles.");
        return Ok(());
    }

    println!("{:<6} {:<14} {:<24} {}", "ID", "Plate", "Make/model", "Owner");
    println!("{}", "-".repeat(56));
    for vehicle in vehicles {
        println!(
            "{:<6} {:<14} {:<24} {}",
            vehicle.id,
            vehicle.license_plate,
            vehicle.make_model,
            vehicle
                .owner_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string()),
        );
    }

    Ok(())
}

pub fn output_owners(output_format: OutputFormat, owners: &[RegistryOwner]) -> Result<()> {
    if output_format == OutputFormat::Json {
        let content = serde_json::to_string_pretty(owners)?;
        println!("{}", content);
        return Ok(());
    }

    if owners.is_empty() {
        println!("No registered owners.");
        return Ok(());
    }

    println!("{:<6} {:<20} {}", "ID", "Name", "Contact");
    println!("{}", "-".repeat(46));
    for owner in owners {
        println!("{:<6} {:<20} {}", owner.id, owner.name, owner.contact_info);
    }

    Ok(())
}
