use std::fs;

use nom::IResult;
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{digit1, space0, space1};
use nom::combinator::{map_res, eof};
use nom::sequence::{pair, preceded, separated_pair, terminated, tuple};

use crate::error::InstanceError;


/// reads an instance from file, returns (n,m,adj_list)
pub fn read_from_file(filename:&str) -> Result<(usize, usize, Vec<Vec<usize>>), InstanceError> {
    let content = fs::read_to_string(filename)?;
    read_from_str(&content)
}

/** reads a DIMACS instance, returns (n,m,adj_list).
 - `c ...` lines are comments
 - `p edge n m` (or `p col n m`) is the header
 - `e a b` is an edge (WARNING: indices start at 1 in the DIMACS format)

Some files list each edge twice, the edge count is checked against both conventions.
*/
pub fn read_from_str(content:&str) -> Result<(usize, usize, Vec<Vec<usize>>), InstanceError> {
    let mut header:Option<(usize,usize)> = None;
    let mut adj_list:Vec<Vec<usize>> = Vec::new();
    let mut check_nb_edges = 0;
    for (i,raw_line) in content.lines().enumerate() {
        let line = raw_line.trim();
        let parse_error = |msg:&str| InstanceError::Parse { line: i+1, msg: msg.to_string() };
        if line.is_empty() || line.starts_with('c') { continue; }
        if line.starts_with('p') {
            if header.is_some() { return Err(parse_error("duplicated header")); }
            let (_,(n,m)) = read_header(line).map_err(|_| parse_error("invalid header"))?;
            header = Some((n,m));
            adj_list = vec![Vec::new() ; n];
        } else if line.starts_with('e') {
            let n = match header {
                None => return Err(parse_error("edge before header")),
                Some((n,_)) => n,
            };
            let (_,(a,b)) = read_edge(line).map_err(|_| parse_error("invalid edge"))?;
            if a == 0 || b == 0 || a > n || b > n {
                return Err(parse_error("edge endpoint out of range"));
            }
            adj_list[a-1].push(b-1);
            adj_list[b-1].push(a-1);
            check_nb_edges += 1;
        } else {
            return Err(parse_error("unknown line type"));
        }
    }
    let (n,m) = header.ok_or_else(|| InstanceError::Parse { line: 0, msg: "missing header".to_string() })?;
    if check_nb_edges != m && check_nb_edges != 2*m {
        return Err(InstanceError::Parse {
            line: 0,
            msg: format!("header announces {} edges, found {}", m, check_nb_edges)
        });
    }
    Ok((n, m, adj_list))
}

/// reads two numbers separated by spaces
fn read_two_integers(s:&str) -> IResult<&str, (usize,usize)> {
    terminated(
        separated_pair(
            map_res(digit1, |d:&str| d.parse::<usize>()),
            space1,
            map_res(digit1, |d:&str| d.parse::<usize>()),
        ),
        pair(space0, eof),
    )(s)
}

/// reads header containing (n,m)
pub fn read_header(s:&str) -> IResult<&str, (usize,usize)> {
    preceded(
        tuple((tag("p"), space1, alt((tag("edge"), tag("col"))), space1)),
        read_two_integers,
    )(s)
}

/// reads edge line
pub fn read_edge(s:&str) -> IResult<&str, (usize,usize)> {
    preceded(pair(tag("e"), space1), read_two_integers)(s)
}
