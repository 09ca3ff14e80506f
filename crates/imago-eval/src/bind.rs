use imago_core::{well_known, ErrorKind, EvalContext, ImagoError, Value};

const HINT: &str = "(bind (param ...) seq)";

/// Destructure a parameter pattern against a value sequence, binding
/// into the current frame.
///
/// Parameters are walked left to right. A `&rest` marker makes the next
/// parameter take a slice of everything remaining; after `&optional`
/// each parameter takes the next value if present, else `nil`. A list
/// parameter recurses into the matching element. Values left over when
/// the parameters run out, or missing for a required parameter, are
/// `wrong_num_of_args`.
pub fn env_bind(ctx: &EvalContext, params: &Value, seq: &Value) -> Result<Value, ImagoError> {
    let Some(vars) = params.as_list() else {
        return Err(ctx.error(ErrorKind::NotAList, HINT, params.clone()));
    };
    if !seq.is_seq() {
        return Err(ctx.error(ErrorKind::NotASequence, HINT, seq.clone()));
    }
    let vars: Vec<Value> = vars.borrow().clone();
    let len_vars = vars.len();
    let len_vals = seq.seq_len().unwrap_or(0);
    let wk = well_known();
    let mut index_vars = 0;
    let mut index_vals = 0;
    let mut state = 0; // 0 required, 1 &rest, 2 &optional
    let mut value = Value::nil();
    while index_vars != len_vars {
        if let Some(s) = vars[index_vars].as_spur() {
            if s == wk.rest {
                state = 1;
                index_vars += 1;
            } else if s == wk.optional {
                state = 2;
                index_vars += 1;
            }
        }
        if index_vars == len_vars {
            break;
        }
        let sym = &vars[index_vars];
        if let Some(s) = sym.as_spur() {
            match state {
                1 => {
                    value = seq
                        .seq_slice(index_vals, len_vals)
                        .unwrap_or_else(Value::nil);
                    index_vars += 1;
                    index_vals = len_vals;
                }
                2 if index_vals == len_vals => {
                    value = Value::nil();
                    index_vars += 1;
                }
                _ => {
                    if state == 0 && index_vals == len_vals {
                        return Err(ctx.error(ErrorKind::WrongNumOfArgs, HINT, seq.clone()));
                    }
                    value = seq.seq_elem(index_vals).unwrap_or_else(Value::nil);
                    index_vals += 1;
                    index_vars += 1;
                }
            }
            ctx.insert(s, value.clone());
        } else if sym.is_list() && index_vals != len_vals {
            let elem = seq.seq_elem(index_vals).unwrap_or_else(Value::nil);
            index_vals += 1;
            value = env_bind(ctx, sym, &elem)?;
            index_vars += 1;
        } else {
            return Err(ctx.error(ErrorKind::NotASymbol, HINT, params.clone()));
        }
    }
    if index_vals == len_vals {
        Ok(value)
    } else {
        Err(ctx.error(ErrorKind::WrongNumOfArgs, HINT, seq.clone()))
    }
}
