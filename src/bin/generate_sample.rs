use anyhow::{Context, Result};

const FIELDS: [(&str, f64); 7] = [
    ("Computer Science", 72000.0),
    ("Engineering", 68000.0),
    ("Business", 55000.0),
    ("Medicine", 64000.0),
    ("Law", 60000.0),
    ("Mathematics", 62000.0),
    ("Arts", 38000.0),
];
const GENDERS: [&str; 3] = ["Female", "Male", "Other"];

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

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let output_path = "sample_outcomes.csv";
    let n_students = 1000;

    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;
    writer.write_record([
        "Student_ID",
        "Gender",
        "SAT_Score",
        "University_GPA",
        "Field_of_Study",
        "Internships_Completed",
        "Projects_Completed",
        "Job_Offers",
        "Starting_Salary",
        "Employment_Status",
    ])?;

    for id in 0..n_students {
        let (field, base_salary) = FIELDS[rng.below(FIELDS.len())];
        let gender = GENDERS[rng.below(GENDERS.len())];
        let gpa = rng.gauss(3.1, 0.4).clamp(2.0, 4.0);
        let sat = (rng.gauss(1200.0, 150.0).clamp(900.0, 1600.0) / 10.0).round() * 10.0;
        let internships = rng.below(5);
        let projects = rng.below(10);
        let offers = (internships + rng.below(3)).min(5);
        let salary = (base_salary + (gpa - 3.0) * 6000.0 + internships as f64 * 1500.0
            + rng.gauss(0.0, 7000.0))
        .max(25000.0)
        .round();
        let status = if offers == 0 {
            "Unemployed"
        } else if rng.chance(0.1) {
            "Further Study"
        } else {
            "Employed"
        };

        // A few dirty cells, as in survey exports.
        let gpa_cell = if rng.chance(0.02) { "N/A".to_string() } else { format!("{gpa:.2}") };
        let salary_cell = if rng.chance(0.02) { "undisclosed".to_string() } else { format!("{salary}") };

        writer.write_record([
            format!("S{id:05}"),
            gender.to_string(),
            format!("{sat}"),
            gpa_cell,
            field.to_string(),
            internships.to_string(),
            projects.to_string(),
            offers.to_string(),
            salary_cell,
            status.to_string(),
        ])?;
    }
    writer.flush()?;

    println!("Wrote {n_students} graduate records to {output_path}");
    Ok(())
}
