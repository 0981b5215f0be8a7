//! Binary brain format.
//!
//! All integers and floats are little-endian:
//!
//! ```text
//! u64 layer_count
//! layer_count times:
//!   u8  activation tag (0 identity, 1 relu, 2 softmax)
//!   f32 temperature           (softmax only)
//!   u64 input_size
//!   u64 output_size
//!   f32 weights[input_size * output_size]   (output index major)
//!   f32 biases[output_size]
//! ```
//!
//! The file loader reads the whole file and decodes it with [`Brain::from_bytes`], so
//! both loaders accept and reject exactly the same inputs.

use std::{
    fs,
    io::{self, Write},
    path::Path,
};

use crate::{Activation, Brain, BrainFileError, DecodeBrainError, Layer, Section};

const TAG_IDENTITY: u8 = 0;
const TAG_RELU: u8 = 1;
const TAG_SOFTMAX: u8 = 2;

impl Brain {
    /// Serialises the brain into `writer`.
    pub fn write_to<W>(&self, writer: &mut W) -> io::Result<()>
    where
        W: Write + ?Sized,
    {
        writer.write_all(&(self.layers().len() as u64).to_le_bytes())?;
        for layer in self.layers() {
            match layer.activation() {
                Activation::Identity => writer.write_all(&[TAG_IDENTITY])?,
                Activation::Relu => writer.write_all(&[TAG_RELU])?,
                Activation::Softmax { temperature } => {
                    writer.write_all(&[TAG_SOFTMAX])?;
                    writer.write_all(&temperature.to_le_bytes())?;
                }
            }
            writer.write_all(&(layer.input_size() as u64).to_le_bytes())?;
            writer.write_all(&(layer.output_size() as u64).to_le_bytes())?;
            for value in layer.weights().iter().chain(layer.biases()) {
                writer.write_all(&value.to_le_bytes())?;
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let len = 8 + self.layers().len() * 21 + self.parameter_count() * 4;
        let mut bytes = Vec::with_capacity(len);
        // writing into a Vec cannot fail
        let _ = self.write_to(&mut bytes);
        bytes
    }

    /// Decodes a brain from an in-memory buffer.
    ///
    /// The whole buffer must be consumed; nothing is returned on any error.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeBrainError> {
        let mut reader = Reader { bytes, offset: 0 };
        let layer_count = reader.u64(Section::LayerCount)?;
        if layer_count == 0 {
            return Err(DecodeBrainError::NoLayers);
        }

        // grows one decoded layer at a time, so a bogus count runs into truncation
        let mut layers = Vec::new();
        let mut prev_output = None;
        while (layers.len() as u64) < layer_count {
            let decoded = reader.layer(layers.len(), prev_output)?;
            prev_output = Some(decoded.output_size());
            layers.push(decoded);
        }

        if reader.remaining() > 0 {
            return Err(DecodeBrainError::TrailingBytes {
                count: reader.remaining(),
            });
        }
        Brain::new(layers).map_err(|source| DecodeBrainError::Build { source })
    }

    /// Writes the brain to `path`, replacing any existing file.
    pub fn save<P>(&self, path: P) -> Result<(), BrainFileError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        fs::write(path, self.to_bytes()).map_err(|source| BrainFileError::Write {
            path: path.to_owned(),
            source,
        })
    }

    /// Reads a brain from `path`.
    pub fn load<P>(path: P) -> Result<Self, BrainFileError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| BrainFileError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::from_bytes(&bytes).map_err(|source| BrainFileError::Decode {
            path: path.to_owned(),
            source,
        })
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl Reader<'_> {
    fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    fn take(&mut self, len: usize, section: Section) -> Result<&[u8], DecodeBrainError> {
        if self.remaining() < len {
            return Err(DecodeBrainError::Truncated {
                section,
                offset: self.bytes.len(),
            });
        }
        let chunk = &self.bytes[self.offset..self.offset + len];
        self.offset += len;
        Ok(chunk)
    }

    fn array<const N: usize>(&mut self, section: Section) -> Result<[u8; N], DecodeBrainError> {
        let mut buf = [0; N];
        buf.copy_from_slice(self.take(N, section)?);
        Ok(buf)
    }

    fn u8(&mut self, section: Section) -> Result<u8, DecodeBrainError> {
        Ok(self.array::<1>(section)?[0])
    }

    fn u64(&mut self, section: Section) -> Result<u64, DecodeBrainError> {
        self.array(section).map(u64::from_le_bytes)
    }

    fn f32(&mut self, section: Section) -> Result<f32, DecodeBrainError> {
        self.array(section).map(f32::from_le_bytes)
    }

    fn f32s(&mut self, count: usize, section: Section) -> Result<Vec<f32>, DecodeBrainError> {
        let len = count.checked_mul(4).ok_or(DecodeBrainError::Truncated {
            section,
            offset: self.bytes.len(),
        })?;
        let chunk = self.take(len, section)?;
        Ok(chunk
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }

    fn layer(
        &mut self,
        layer: usize,
        prev_output: Option<usize>,
    ) -> Result<Layer, DecodeBrainError> {
        let activation = match self.u8(Section::Activation(layer))? {
            TAG_IDENTITY => Activation::Identity,
            TAG_RELU => Activation::Relu,
            TAG_SOFTMAX => {
                let temperature = self.f32(Section::Temperature(layer))?;
                if !(temperature.is_finite() && temperature > 0.0) {
                    return Err(DecodeBrainError::InvalidTemperature { layer, temperature });
                }
                Activation::Softmax { temperature }
            }
            tag => return Err(DecodeBrainError::UnknownActivation { layer, tag }),
        };

        let raw_input = self.u64(Section::InputSize(layer))?;
        let raw_output = self.u64(Section::OutputSize(layer))?;
        if raw_input == 0 || raw_output == 0 {
            return Err(DecodeBrainError::EmptyLayer {
                layer,
                input_size: raw_input,
                output_size: raw_output,
            });
        }
        let overflow = DecodeBrainError::SizeOverflow {
            layer,
            input_size: raw_input,
            output_size: raw_output,
        };
        let (Ok(input_size), Ok(output_size)) =
            (usize::try_from(raw_input), usize::try_from(raw_output))
        else {
            return Err(overflow);
        };
        let Some(weight_count) = input_size.checked_mul(output_size) else {
            return Err(overflow);
        };
        if let Some(expected) = prev_output
            && expected != input_size
        {
            return Err(DecodeBrainError::ChainMismatch {
                layer,
                expected,
                found: input_size,
            });
        }

        let weights = self.f32s(weight_count, Section::Weights(layer))?;
        let biases = self.f32s(output_size, Section::Biases(layer))?;
        Layer::from_parts(input_size, weights, biases, activation)
            .map_err(|e| DecodeBrainError::Build {
                source: e.at_layer(layer),
            })
    }
}

#[cfg(test)]
mod tests {
    use std::{
        env, process,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::LayerSpec;

    fn sample_brain() -> Brain {
        let mut rng = Pcg32::seed_from_u64(42);
        Brain::random(
            5,
            &[
                LayerSpec::new(4, Activation::Relu),
                LayerSpec::new(3, Activation::Identity),
                LayerSpec::new(2, Activation::Softmax { temperature: 0.75 }),
            ],
            &mut rng,
        )
        .unwrap()
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        env::temp_dir().join(format!("gambit-brain-{}-{name}-{n}.brain", process::id()))
    }

    fn assert_bit_identical(a: &Brain, b: &Brain) {
        assert_eq!(a.layers().len(), b.layers().len());
        for (x, y) in a.layers().iter().zip(b.layers()) {
            assert_eq!(x.input_size(), y.input_size());
            assert_eq!(x.output_size(), y.output_size());
            assert_eq!(x.activation(), y.activation());
            let bits = |v: &[f32]| v.iter().map(|f| f.to_bits()).collect::<Vec<_>>();
            assert_eq!(bits(x.weights()), bits(y.weights()));
            assert_eq!(bits(x.biases()), bits(y.biases()));
        }
    }

    #[test]
    fn test_buffer_round_trip() {
        let brain = sample_brain();
        let bytes = brain.to_bytes();
        assert_eq!(
            bytes.len(),
            8 + 3 * 17 + 4 + (5 * 4 + 4 + 4 * 3 + 3 + 3 * 2 + 2) * 4
        );
        let decoded = Brain::from_bytes(&bytes).unwrap();
        assert_bit_identical(&brain, &decoded);
        assert_eq!(decoded.to_bytes(), bytes);
    }

    #[test]
    fn test_file_round_trip_matches_buffer() {
        let brain = sample_brain();
        let path = temp_path("round-trip");
        brain.save(&path).unwrap();
        let from_file = Brain::load(&path).unwrap();
        let from_buffer = Brain::from_bytes(&fs::read(&path).unwrap()).unwrap();
        fs::remove_file(&path).unwrap();
        assert_bit_identical(&brain, &from_file);
        assert_bit_identical(&from_file, &from_buffer);
    }

    #[test]
    fn test_header_layout() {
        let layer = Layer::from_parts(
            1,
            vec![1.0],
            vec![-2.0],
            Activation::Softmax { temperature: 0.5 },
        )
        .unwrap();
        let bytes = Brain::new(vec![layer]).unwrap().to_bytes();
        let mut expected = vec![];
        expected.extend(1_u64.to_le_bytes());
        expected.push(2);
        expected.extend(0.5_f32.to_le_bytes());
        expected.extend(1_u64.to_le_bytes());
        expected.extend(1_u64.to_le_bytes());
        expected.extend(1.0_f32.to_le_bytes());
        expected.extend((-2.0_f32).to_le_bytes());
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_every_truncation_is_rejected() {
        let bytes = sample_brain().to_bytes();
        for len in 0..bytes.len() {
            let err = Brain::from_bytes(&bytes[..len]).unwrap_err();
            assert!(err.is_truncated(), "len {len}: {err}");
        }
    }

    #[test]
    fn test_truncation_names_section() {
        let bytes = sample_brain().to_bytes();
        // layer count + tag + sizes of layer 0, then 3 bytes of weights
        let err = Brain::from_bytes(&bytes[..8 + 17 + 3]).unwrap_err();
        assert!(matches!(
            err,
            DecodeBrainError::Truncated {
                section: Section::Weights(0),
                ..
            }
        ));
        assert_eq!(
            err.to_string(),
            "input truncated at byte 28 while reading weights of layer 0"
        );
    }

    #[test]
    fn test_rejects_malformed_headers() {
        let mut zero_layers = vec![];
        zero_layers.extend(0_u64.to_le_bytes());
        assert!(Brain::from_bytes(&zero_layers).unwrap_err().is_no_layers());

        let mut bad_tag = vec![];
        bad_tag.extend(1_u64.to_le_bytes());
        bad_tag.push(9);
        assert!(matches!(
            Brain::from_bytes(&bad_tag).unwrap_err(),
            DecodeBrainError::UnknownActivation { layer: 0, tag: 9 }
        ));

        let mut bad_temperature = vec![];
        bad_temperature.extend(1_u64.to_le_bytes());
        bad_temperature.push(TAG_SOFTMAX);
        bad_temperature.extend((-1.0_f32).to_le_bytes());
        assert!(
            Brain::from_bytes(&bad_temperature)
                .unwrap_err()
                .is_invalid_temperature()
        );

        let mut empty = vec![];
        empty.extend(1_u64.to_le_bytes());
        empty.push(TAG_RELU);
        empty.extend(0_u64.to_le_bytes());
        empty.extend(4_u64.to_le_bytes());
        assert!(Brain::from_bytes(&empty).unwrap_err().is_empty_layer());

        let mut huge = vec![];
        huge.extend(1_u64.to_le_bytes());
        huge.push(TAG_RELU);
        huge.extend(u64::MAX.to_le_bytes());
        huge.extend(u64::MAX.to_le_bytes());
        assert!(Brain::from_bytes(&huge).unwrap_err().is_size_overflow());
    }

    #[test]
    fn test_rejects_chain_mismatch() {
        let a = Layer::zeros(2, 3, Activation::Relu).unwrap();
        let b = Layer::zeros(3, 1, Activation::Identity).unwrap();
        let mut bytes = Brain::new(vec![a, b]).unwrap().to_bytes();
        // input size of layer 1 sits after layer 0 and the tag of layer 1
        let offset = 8 + 17 + (2 * 3 + 3) * 4 + 1;
        bytes[offset..offset + 8].copy_from_slice(&4_u64.to_le_bytes());
        let err = Brain::from_bytes(&bytes).unwrap_err();
        assert!(matches!(
            err,
            DecodeBrainError::ChainMismatch {
                layer: 1,
                expected: 3,
                found: 4
            }
        ));
    }

    #[test]
    fn test_rejects_trailing_bytes() {
        let mut bytes = sample_brain().to_bytes();
        bytes.extend([0, 0]);
        assert!(matches!(
            Brain::from_bytes(&bytes).unwrap_err(),
            DecodeBrainError::TrailingBytes { count: 2 }
        ));
    }

    #[test]
    fn test_load_errors_carry_path() {
        let path = temp_path("missing");
        let err = Brain::load(&path).unwrap_err();
        assert!(err.is_read());
        assert!(err.to_string().contains(&*path.to_string_lossy()));

        let path = temp_path("garbage");
        fs::write(&path, [1, 2, 3]).unwrap();
        let err = Brain::load(&path).unwrap_err();
        fs::remove_file(&path).unwrap();
        assert!(matches!(
            err,
            BrainFileError::Decode {
                source: DecodeBrainError::Truncated {
                    section: Section::LayerCount,
                    ..
                },
                ..
            }
        ));
    }
}
