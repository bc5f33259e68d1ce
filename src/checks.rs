use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSizeCheck {
    pub ok: bool,
    pub message: String,
}

/// Assess the field size against the preferred band (inclusive).
pub fn validate_field_size(
    num_runners: Option<usize>,
    preferred_min: usize,
    preferred_max: usize,
) -> FieldSizeCheck {
    let Some(n) = num_runners else {
        return FieldSizeCheck {
            ok: false,
            message: "Unknown field size".to_string(),
        };
    };
    if n < preferred_min {
        FieldSizeCheck {
            ok: false,
            message: format!("Small field ({n} runners) - higher risk"),
        }
    } else if n > preferred_max {
        FieldSizeCheck {
            ok: false,
            message: format!("Large field ({n} runners) - harder to pick"),
        }
    } else {
        FieldSizeCheck {
            ok: true,
            message: format!("Ideal field size ({n} runners)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarrierCheck {
    pub ok: bool,
    pub message: String,
}

/// Barrier grading: <=8 good, <=`preferred_max` acceptable, wider is wide.
pub fn barrier_ok(barrier: Option<u32>, preferred_max: u32) -> BarrierCheck {
    match barrier {
        None => BarrierCheck {
            ok: false,
            message: "No barrier info".to_string(),
        },
        Some(b) if b <= 8 => BarrierCheck {
            ok: true,
            message: format!("Good barrier ({b})"),
        },
        Some(b) if b <= preferred_max => BarrierCheck {
            ok: true,
            message: format!("Acceptable barrier ({b})"),
        },
        Some(b) => BarrierCheck {
            ok: false,
            message: format!("Wide barrier ({b})"),
        },
    }
}
