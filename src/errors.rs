use crate::derivatives::CombiningMetric;
use crate::field::ElementType;
use crate::hessian::HessianOutput;

error_chain! {
    types {
        Error, ErrorKind, ResultExt, Result;
    }

    // Every variant is a configuration error: raised while a field
    // expression is being set up, never while pixels are evaluated.
    errors {
        EmptyFieldList {
            description("No fields to combine.")
            display("No fields to combine.")
        }
        DimensionsMismatch(expected: (usize, usize), actual: (usize, usize)) {
            description("Fields have different dimensions.")
            display("Field dimensions mismatch: expected {}x{}, got {}x{}",
                    expected.0, expected.1, actual.0, actual.1)
        }
        ElementTypeMismatch(expected: ElementType, actual: ElementType) {
            description("Channels have different element types.")
            display("Channel element type mismatch: expected {:?}, got {:?}", expected, actual)
        }
        BufferLength(expected: usize, actual: usize) {
            description("Sample buffer does not match the field dimensions.")
            display("Sample buffer has {} values, dimensions require {}", actual, expected)
        }
        SingleChannelMetric(metric: CombiningMetric, count: usize) {
            description("Single-channel metric applied to several fields.")
            display("Metric {:?} accepts exactly one field, got {}", metric, count)
        }
        SingleChannelDerivativesMetric(metric: CombiningMetric) {
            description("Single-channel metric cannot combine x/y-derivatives.")
            display("Cannot use single-channel metric {:?} for combining x/y-derivatives", metric)
        }
        MissingGradient(output: HessianOutput) {
            description("Output requires gradient fields.")
            display("Output '{}' requires the gradient (dx, dy) fields", output.name())
        }
        UnknownOutput(name: String) {
            description("Unknown output name.")
            display("Unknown output name: '{}'", name)
        }
    }
}
