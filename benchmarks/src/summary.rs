use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "B+")]
    BPlus,
    B,
    C,
    F,
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::C => "C",
            Grade::F => "F",
        };
        write!(f, "{}", s)
    }
}

/// Overall grade from parallel speedup, mean MCP response time and memory footprint
pub fn overall_grade(speedup: f64, avg_mcp_ms: u64, memory_efficient: bool) -> Grade {
    if speedup >= 3.5 && avg_mcp_ms <= 150 && memory_efficient {
        Grade::APlus
    } else if speedup >= 3.0 && avg_mcp_ms <= 200 {
        Grade::A
    } else if speedup >= 2.5 && avg_mcp_ms <= 250 {
        Grade::BPlus
    } else if speedup >= 2.0 {
        Grade::B
    } else if speedup >= 1.5 {
        Grade::C
    } else {
        Grade::F
    }
}

pub fn recommendations(speedup: f64, speedup_threshold: f64, avg_mcp_ms: u64) -> Vec<String> {
    let mut recs = Vec::new();

    if speedup < speedup_threshold {
        recs.push(format!(
            "Optimize parallel coordination to achieve {}x+ speedup",
            speedup_threshold
        ));
    }
    if avg_mcp_ms > 200 {
        recs.push("Optimize MCP server response times (<200ms target)".to_string());
    }
    if speedup >= 3.5 {
        recs.push("Excellent performance! Ready for production deployment".to_string());
    }

    recs.push("Monitor performance in production environments".to_string());
    recs.push("Consider scaling to 8+ agents for larger workloads".to_string());
    recs
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyMetrics {
    pub parallel_speedup: String,
    pub max_agents_coordinated: u32,
    pub avg_mcp_response_time: u64,
    pub performance_threshold_met: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub overall_grade: Grade,
    pub key_metrics: KeyMetrics,
    pub recommendations: Vec<String>,
}
