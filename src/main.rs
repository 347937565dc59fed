use std::sync::Arc;

use datafusion::prelude::*;

use synth_records::datasets::LookupTables;
use synth_records::{
    generate_rows, load_record_batch, make_rng, save_record_batch, to_record_batch, write_csv,
    Dataset, PersonCollection,
};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    env_logger::init();

    let seed = 3;
    let mut cohort = PersonCollection::new();
    cohort.generate_people(500, &mut make_rng(seed, "people"));
    log::info!("generated a cohort of {} people", cohort.len());

    let lookups = Arc::new(LookupTables::new());

    for dataset in Dataset::all() {
        // the wide stress tables make very large files; keep the demo small
        let num_records = match dataset {
            Dataset::Wide => 100,
            Dataset::UltraWide => 10,
            _ => 5000,
        };

        let mut generator = dataset.create(&lookups);
        let filename = format!("{}.csv", dataset.name());
        let mut rng = make_rng(seed, dataset.name());
        write_csv(
            generator.as_mut(),
            &cohort,
            num_records,
            &mut rng,
            &filename,
            |progress| {
                if progress.is_finished {
                    println!(
                        "{filename}: {} rows in {:?}",
                        progress.rows_written, progress.elapsed
                    );
                }
            },
        )?;
    }

    // round-trip one dataset through parquet and query it back
    let mut generator = Dataset::Biochemistry.create(&lookups);
    let mut rng = make_rng(seed, "biochemistry-parquet");
    let rows = generate_rows(generator.as_mut(), &cohort, 1000, &mut rng);
    let batch = to_record_batch(&generator.headers(), &rows)?;
    save_record_batch("biochemistry.parquet", batch)?;

    let batch = load_record_batch("biochemistry.parquet")?;
    let ctx = SessionContext::new();
    let df = ctx.read_batch(batch)?;
    df.show().await?;

    Ok(())
}
