use core::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::rule::TimeType;

impl TimeType {
    fn as_str(self) -> &'static str {
        match self {
            TimeType::Wall => "wall",
            TimeType::Standard => "standard",
            TimeType::Utc => "utc",
        }
    }
}

impl Serialize for TimeType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TimeType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct Visitor;

        impl<'de> de::Visitor<'de> for Visitor {
            type Value = TimeType;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(formatter, "one of \"wall\", \"standard\" or \"utc\"")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<TimeType, E> {
                match value {
                    "wall" => Ok(TimeType::Wall),
                    "standard" => Ok(TimeType::Standard),
                    "utc" => Ok(TimeType::Utc),
                    _ => Err(E::custom(format!("'{}' is not a valid time type", value))),
                }
            }
        }

        deserializer.deserialize_str(Visitor)
    }
}

#[cfg(test)]
mod tests {
    use serde_test::{assert_de_tokens_error, assert_tokens, Token};

    use crate::rule::TimeType;
    use crate::timezone::ZoneOffset;

    #[test]
    fn serde_ok_both_ways() {
        assert_tokens(&TimeType::Wall, &[Token::String("wall")]);
        assert_tokens(&TimeType::Standard, &[Token::String("standard")]);
        assert_tokens(&TimeType::Utc, &[Token::String("utc")]);
    }

    #[test]
    fn serde_de_error() {
        assert_de_tokens_error::<TimeType>(
            &[Token::Str("local")],
            "'local' is not a valid time type",
        );
    }

    #[test]
    fn zone_offset() {
        let offset = ZoneOffset {
            raw_offset: 3_600_000,
            dst_savings: 0,
        };
        assert_tokens(
            &offset,
            &[
                Token::Struct {
                    name: "ZoneOffset",
                    len: 2,
                },
                Token::Str("raw_offset"),
                Token::I64(3_600_000),
                Token::Str("dst_savings"),
                Token::I64(0),
                Token::StructEnd,
            ],
        );
    }
}
