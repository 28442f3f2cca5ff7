//! Writes a deterministic sample dataset (`sample_data.csv`) with the column
//! shapes the dashboard expects: a municipality, income-group, gender and
//! year column for the role heuristics, coordinates for the map view, and a
//! few numeric indicator columns for the scatter axes.

use anyhow::{Context, Result};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    // Municipality → (lat, lon) city centre.
    let municipalities: [(&str, f64, f64); 5] = [
        ("Monterrey", 25.6866, -100.3161),
        ("Guadalajara", 20.6597, -103.3496),
        ("Puebla", 19.0414, -98.2063),
        ("Tijuana", 32.5149, -117.0382),
        ("Mérida", 20.9674, -89.5926),
    ];
    let income_groups = ["Q1 (lowest)", "Q2", "Q3", "Q4 (highest)"];
    let genders = ["female", "male"];
    let years = [2018, 2019, 2020, 2021, 2022];

    let path = "sample_data.csv";
    let mut writer = csv::Writer::from_path(path).context("creating sample CSV")?;
    writer.write_record([
        "Municipality",
        "Income Group",
        "Gender",
        "Year",
        "Latitude",
        "Longitude",
        "Gini Index",
        "Service Access Score",
        "Commute Minutes",
    ])?;

    let mut rows = 0usize;
    for (municipality, lat, lon) in municipalities {
        for income in income_groups {
            for gender in genders {
                for year in years {
                    // Higher quartile → lower inequality exposure, better access.
                    let quartile = income_groups.iter().position(|g| *g == income).unwrap() as f64;
                    let gini = (0.52 - 0.04 * quartile + rng.gauss(0.0, 0.02)).clamp(0.2, 0.7);
                    let access = (40.0 + 12.0 * quartile + rng.gauss(0.0, 5.0)).clamp(0.0, 100.0);
                    let commute = (75.0 - 8.0 * quartile + rng.gauss(0.0, 10.0)).max(5.0);

                    writer.write_record([
                        municipality.to_string(),
                        income.to_string(),
                        gender.to_string(),
                        year.to_string(),
                        format!("{:.5}", lat + rng.gauss(0.0, 0.05)),
                        format!("{:.5}", lon + rng.gauss(0.0, 0.05)),
                        format!("{gini:.3}"),
                        format!("{access:.1}"),
                        format!("{commute:.1}"),
                    ])?;
                    rows += 1;
                }
            }
        }
    }
    writer.flush().context("writing sample CSV")?;

    println!("Wrote {rows} rows to {path}");
    Ok(())
}
