use crate::intersect::Intersected;
use crate::json::JsonWriter;
use crate::node::{Inner, Meta, Node};
use crate::value::Value;
use serde_json::{Map, Value as JsonValue};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DivisorInner {
    pub divisor: u64,
}

impl DivisorInner {
    pub(crate) fn describe(&self) -> String {
        if self.divisor == 1 {
            "an integer".to_string()
        } else {
            format!("a multiple of {}", self.divisor)
        }
    }

    pub(crate) fn to_json(&self, w: &JsonWriter<'_>, meta: &Meta) -> JsonValue {
        let mut fields = Map::new();
        fields.insert("divisor".into(), JsonValue::from(self.divisor));
        w.finish(Some(JsonValue::from(self.divisor)), fields, meta)
    }

    pub(crate) fn condition(&self, arg: &str) -> String {
        format!("{arg} % {} === 0", self.divisor)
    }

    pub(crate) fn allows(&self, data: &Value) -> bool {
        data.as_number()
            .is_some_and(|n| n.is_finite() && n % self.divisor as f64 == 0.0)
    }
}

pub(crate) fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Least common multiple, or `None` on overflow.
pub(crate) fn lcm(a: u64, b: u64) -> Option<u64> {
    (a / gcd(a, b)).checked_mul(b)
}

/// Being a multiple of both divisors is being a multiple of their lcm.
pub(crate) fn intersect_divisors(l: &Node, r: &Node) -> Intersected {
    let (Inner::Divisor(a), Inner::Divisor(b)) = (l.inner(), r.inner()) else {
        return Intersected::Orthogonal;
    };
    match lcm(a.divisor, b.divisor) {
        Some(n) if n == a.divisor => Intersected::Node(l.clone()),
        Some(n) if n == b.divisor => Intersected::Node(r.clone()),
        Some(n) => Intersected::Node(
            l.space()
                .intern(Inner::Divisor(DivisorInner { divisor: n }), Meta::default()),
        ),
        None => Intersected::Orthogonal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gcd_and_lcm() {
        assert_eq!(gcd(12, 18), 6);
        assert_eq!(gcd(7, 1), 1);
        assert_eq!(lcm(2, 3), Some(6));
        assert_eq!(lcm(4, 6), Some(12));
        assert_eq!(lcm(5, 5), Some(5));
        assert_eq!(lcm(u64::MAX, 2), None);
    }

    #[test]
    fn test_divisor_description() {
        assert_eq!(DivisorInner { divisor: 1 }.describe(), "an integer");
        assert_eq!(DivisorInner { divisor: 3 }.describe(), "a multiple of 3");
    }
}
