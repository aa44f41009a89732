use criterion::{Criterion, criterion_group, criterion_main};

use annograph::{Builder, BuilderConfig, Record, Strand};

const GENES: usize = 2_000;
const EXONS_PER_TRANSCRIPT: u64 = 8;

/// Synthetic annotation with every child listed before its parent.
fn reversed_records() -> Vec<Record> {
    let mut records =
        vec![Record::new("chromosome", "chr1", 1, 100_000_000, Strand::Forward).with_id("chr1")];
    for g in 0..GENES {
        let strand = if g % 2 == 0 {
            Strand::Forward
        } else {
            Strand::Reverse
        };
        let gene_id = format!("gene-{g}");
        let tx_id = format!("rna-{g}");
        let base = g as u64 * 10_000 + 1;
        records.push(
            Record::new("gene", "chr1", base, base + 9_000, strand).with_id(&gene_id),
        );
        records.push(
            Record::new("mRNA", "chr1", base, base + 9_000, strand)
                .with_id(&tx_id)
                .with_parent(&gene_id),
        );
        for e in 0..EXONS_PER_TRANSCRIPT {
            let start = base + e * 1_000;
            records.push(
                Record::new("exon", "chr1", start, start + 499, strand).with_parent(&tx_id),
            );
            records.push(
                Record::new("CDS", "chr1", start + 100, start + 399, strand).with_parent(&tx_id),
            );
        }
    }
    records.reverse();
    records
}

fn bench_build(c: &mut Criterion) {
    let records = reversed_records();
    let config = BuilderConfig::default();

    c.bench_function("build (2000 genes, children first)", |b| {
        b.iter(|| {
            let output = Builder::new(&config).unwrap().run(records.clone()).unwrap();
            assert_eq!(output.annotation.genes().count(), GENES);
            assert!(output.warnings.is_empty());
        });
    });
}

fn bench_coordinates(c: &mut Criterion) {
    let output = Builder::new(&BuilderConfig::default())
        .unwrap()
        .run(reversed_records())
        .unwrap();
    let annotation = output.annotation;
    let mappers: Vec<_> = annotation
        .transcripts()
        .map(|(id, _)| annotation.mapper(id).unwrap())
        .collect();

    c.bench_function("rel_to_abs/abs_to_rel round trip", |b| {
        b.iter(|| {
            for mapper in &mappers {
                for rel in (1..=mapper.length()).step_by(97) {
                    let abs = mapper.rel_to_abs(rel).unwrap();
                    assert_eq!(mapper.abs_to_rel(abs).unwrap(), rel);
                }
            }
        });
    });
}

criterion_group!(benches, bench_build, bench_coordinates);
criterion_main!(benches);
