use rand::Rng;
use std::fs::File;
use std::io::Error;
use std::path::Path;

pub fn write_events(path: &Path, rows: &[(&str, &str, i64)]) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(["transactionID", "otp", "createdTime"])?;

    for (id, otp, created_time) in rows {
        let created_time = created_time.to_string();
        wtr.write_record([*id, *otp, created_time.as_str()])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Generates `pairs` request/confirmation rows sharing an OTP, with the
/// confirmation landing inside the 5 minute window. Replaying the two files
/// yields exactly one Success row per pair.
pub fn generate_paired_events(
    requests: &Path,
    confirmations: &Path,
    pairs: usize,
) -> Result<(), Error> {
    let mut rng = rand::thread_rng();
    let mut req_wtr = csv::WriterBuilder::new().from_writer(File::create(requests)?);
    let mut conf_wtr = csv::WriterBuilder::new().from_writer(File::create(confirmations)?);

    req_wtr.write_record(["transactionID", "otp", "createdTime"])?;
    conf_wtr.write_record(["transactionID", "otp", "createdTime"])?;

    for i in 0..pairs {
        let id = format!("T{i}");
        let otp = format!("{:04}", rng.gen_range(0..10000));
        let created = (i as i64) * 1000;
        let confirmed = created + rng.gen_range(0..=300000);

        let created = created.to_string();
        let confirmed = confirmed.to_string();
        req_wtr.write_record([id.as_str(), otp.as_str(), created.as_str()])?;
        conf_wtr.write_record([id.as_str(), otp.as_str(), confirmed.as_str()])?;
    }

    req_wtr.flush()?;
    conf_wtr.flush()?;
    Ok(())
}
